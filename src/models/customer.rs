// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Cliente final do estabelecimento (não tem conta de acesso)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub professional_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Silva")]
    pub full_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub contact_number: Option<String>,
    /// Só considerado quando quem cria é admin
    #[serde(default)]
    pub professional_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub professional_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfessionalQuery {
    pub professional_id: Option<Uuid>,
}
