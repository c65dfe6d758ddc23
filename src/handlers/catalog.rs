// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::catalog::{
        CategoryDetail, CategoryPayload, CreateServicePayload, ServiceDetail, UpdateServicePayload,
    },
};

// =============================================================================
//  ÁREA 1: SERVIÇOS
// =============================================================================

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catalog",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Serviços com colaboradores", body = Vec<ServiceDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let services = app_state
        .catalog_service
        .list_services(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(services)))
}

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Catalog",
    request_body = CreateServicePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Serviço criado", body = ServiceDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Referência duplicada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .create_service(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/services/{id}
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Serviço", body = ServiceDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = app_state
        .catalog_service
        .get_service(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(service)))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Catalog",
    request_body = UpdateServicePayload,
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Serviço atualizado", body = ServiceDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .update_service(tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(service)))
}

// DELETE /api/services/{id}
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Serviço removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_service(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: CATEGORIAS
// =============================================================================

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Categorias com os seus serviços", body = Vec<CategoryDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .catalog_service
        .list_categories(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(categories)))
}

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CategoryPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 201, description = "Categoria criada", body = CategoryDetail)),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .create_category(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "ID da categoria"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Categoria", body = CategoryDetail),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .catalog_service
        .get_category(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(category)))
}

// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Catalog",
    request_body = CategoryPayload,
    params(
        ("id" = Uuid, Path, description = "ID da categoria"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Categoria atualizada", body = CategoryDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .update_category(tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "ID da categoria"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Categoria removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_category(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
