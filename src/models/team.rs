// src/models/team.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::Role, availability::WeeklyAvailability};

// Membro da equipa: conta global + dados da associação ao tenant
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub contact_number: Option<String>,
    pub personal_mobile: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub collaborator_code: Option<String>,
    pub specialty: Option<String>,
    pub color_scheme: Option<String>,
    pub commission_executing_percent: Decimal,
    pub commission_executing_euro: Option<Decimal>,
    pub commission_responsible_percent: Decimal,
    pub commission_responsible_euro: Option<Decimal>,
    pub remaining_hours: Decimal,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberDetail {
    #[serde(flatten)]
    pub member: TeamMember,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<WeeklyAvailability>,
    pub customer_ids: Vec<Uuid>,
    /// category_id -> [service_id]; serviços sem categoria ficam de fora
    pub services_by_category: HashMap<Uuid, Vec<Uuid>>,
}

// Campos da associação que o admin pode definir
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFields {
    pub collaborator_code: Option<String>,
    pub specialty: Option<String>,
    pub color_scheme: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Percentagem entre 0 e 100."))]
    pub commission_executing_percent: Option<f64>,
    #[validate(range(min = 0.0, message = "O valor não pode ser negativo."))]
    pub commission_executing_euro: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Percentagem entre 0 e 100."))]
    pub commission_responsible_percent: Option<f64>,
    #[validate(range(min = 0.0, message = "O valor não pode ser negativo."))]
    pub commission_responsible_euro: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    /// Obrigatória apenas quando a conta ainda não existe
    pub password: Option<String>,
    pub contact_number: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    #[validate(nested)]
    pub membership: MembershipFields,
    pub availability: Option<WeeklyAvailability>,
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,
    #[serde(default)]
    pub category_services: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    pub contact_number: Option<String>,
    pub personal_mobile: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    #[serde(flatten)]
    #[validate(nested)]
    pub membership: MembershipFields,
    pub availability: Option<WeeklyAvailability>,
    pub customer_ids: Option<Vec<Uuid>>,
    pub category_services: Option<HashMap<Uuid, Vec<Uuid>>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamFilter {
    pub role: Option<Role>,
}
