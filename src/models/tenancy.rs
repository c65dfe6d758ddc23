// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::Role;

// ---
// 1. Tenant (O "Estabelecimento": estúdio, clínica...)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Membership (A "Ponte" Usuário-Tenant)
// ---
// Papel, estado e saldo de horas do usuário dentro de um estabelecimento
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub is_active: bool,
    pub remaining_hours: Decimal,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_professional(&self) -> bool {
        self.role == Role::Professional
    }
}

// Um tenant visto pelo usuário, com o seu papel
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTenant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub role: Role,
    pub is_active: bool,
}
