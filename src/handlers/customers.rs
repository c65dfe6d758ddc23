// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentMembership, i18n::Locale, tenancy::TenantContext},
    models::customer::{
        CreateCustomerPayload, Customer, CustomerDetail, ProfessionalQuery, UpdateCustomerPayload,
    },
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Clientes visíveis ao usuário", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .list(tenant.0, &member)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customers)))
}

// GET /api/clients/by_professional
#[utoipa::path(
    get,
    path = "/api/clients/by_professional",
    tag = "Clients",
    params(
        ProfessionalQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Clientes do profissional", body = Vec<Customer>),
        (status = 400, description = "professional_id em falta"),
        (status = 404, description = "Não é profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn customers_by_professional(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ProfessionalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .by_professional(tenant.0, query.professional_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customers)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateCustomerPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Cliente criado", body = CustomerDetail),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let customer = app_state
        .customer_service
        .create(tenant.0, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Cliente", body = CustomerDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .customer_service
        .get(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customer)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = UpdateCustomerPayload,
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Cliente atualizado", body = CustomerDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let customer = app_state
        .customer_service
        .update(tenant.0, &member, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Cliente removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .customer_service
        .delete(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
