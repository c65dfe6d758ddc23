// src/models/class.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{customer::Customer, room::ResourceActions},
};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub capacity: i32,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Número de clientes inscritos não pode exceder a capacidade.
pub fn check_capacity(capacity: i32, client_count: usize) -> Result<(), AppError> {
    if client_count > capacity.max(0) as usize {
        return Err(AppError::field(
            "clients",
            format!(
                "Cannot assign {} clients to a class with capacity {}.",
                client_count, capacity
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: Class,
    pub professional_ids: Vec<Uuid>,
    pub clients: Vec<Customer>,
    pub actions: ResourceActions,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Yoga Matinal")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "Duration must be a positive integer."))]
    #[schema(example = 60)]
    pub duration: i32,
    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default)]
    pub professional_ids: Vec<Uuid>,
    #[serde(default)]
    pub client_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be a positive integer."))]
    pub duration: Option<i32>,
    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    pub capacity: Option<i32>,
    pub status: Option<bool>,
    pub professional_ids: Option<Vec<Uuid>>,
    pub client_ids: Option<Vec<Uuid>>,
}

fn default_capacity() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_allows_full_class() {
        assert!(check_capacity(3, 3).is_ok());
        assert!(check_capacity(3, 0).is_ok());
    }

    #[test]
    fn capacity_rejects_overbooking() {
        let err = check_capacity(2, 3).unwrap_err();
        match err {
            AppError::FieldErrors(map) => assert!(map.contains_key("clients")),
            other => panic!("erro inesperado: {:?}", other),
        }
    }
}
