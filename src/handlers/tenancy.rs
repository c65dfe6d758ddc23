// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::tenancy::{Tenant, UserTenant},
};

// O que o cliente envia para criar um estabelecimento
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTenantPayload {
    #[validate(length(min = 1, message = "O nome do estabelecimento é obrigatório."))]
    #[schema(example = "Estúdio Lumen")]
    pub name: String,
    pub description: Option<String>,
}

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenancy",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Estabelecimento criado; o criador fica admin", body = Tenant),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let tenant = app_state
        .tenant_service
        .create_tenant_with_admin(&payload.name, payload.description.as_deref(), user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenancy",
    responses((status = 200, description = "Estabelecimentos do usuário", body = Vec<UserTenant>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_tenants(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let tenants = app_state
        .tenant_service
        .list_for_user(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tenants)))
}
