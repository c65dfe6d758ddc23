// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Durações permitidas para um serviço, em minutos.
pub const SERVICE_DURATIONS: [i32; 5] = [15, 30, 45, 60, 90];

pub fn validate_service_duration(duration: i32) -> Result<(), ValidationError> {
    if SERVICE_DURATIONS.contains(&duration) {
        Ok(())
    } else {
        let mut err = ValidationError::new("duration");
        err.message = Some("Duration must be one of 15, 30, 45, 60 or 90 minutes.".into());
        Err(err)
    }
}

// ---
// Categoria
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub services: Vec<Service>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Massagens")]
    pub name: String,
    #[serde(default = "default_true")]
    pub status: bool,
}

// ---
// Serviço
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub reference: String,
    pub category_id: Option<Uuid>,
    pub duration: i32,
    pub rate: Decimal,
    pub price: Decimal,
    pub show_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    pub collaborator_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Massagem de relaxamento")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "MR-60")]
    pub reference: String,
    pub category_id: Option<Uuid>,
    #[validate(custom(function = "validate_service_duration"))]
    #[schema(example = 60)]
    pub duration: i32,
    #[validate(range(min = 0.0, message = "Rate cannot be negative."))]
    #[serde(default)]
    pub rate: f64,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_true")]
    pub show_online: bool,
    #[serde(default)]
    pub collaborator_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub reference: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(custom(function = "validate_service_duration"))]
    pub duration: Option<i32>,
    #[validate(range(min = 0.0, message = "Rate cannot be negative."))]
    pub rate: Option<f64>,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub price: Option<f64>,
    pub show_online: Option<bool>,
    pub collaborator_ids: Option<Vec<Uuid>>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(duration: i32, price: f64) -> CreateServicePayload {
        CreateServicePayload {
            name: "Shiatsu".into(),
            reference: "SH-1".into(),
            category_id: None,
            duration,
            rate: 0.0,
            price,
            show_online: true,
            collaborator_ids: vec![],
        }
    }

    #[test]
    fn only_listed_durations_are_accepted() {
        for minutes in SERVICE_DURATIONS {
            assert!(payload(minutes, 10.0).validate().is_ok());
        }
        assert!(payload(20, 10.0).validate().is_err());
        assert!(payload(0, 10.0).validate().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let errors = payload(30, -1.0).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn partial_update_validates_present_fields_only() {
        let update = UpdateServicePayload {
            duration: Some(45),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = UpdateServicePayload {
            duration: Some(50),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
