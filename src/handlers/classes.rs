// src/handlers/classes.rs

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
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        class::{ClassDetail, CreateClassPayload, UpdateClassPayload},
        customer::ProfessionalQuery,
    },
};

// GET /api/classes
#[utoipa::path(
    get,
    path = "/api/classes",
    tag = "Classes",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Aulas", body = Vec<ClassDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_classes(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let classes = app_state
        .class_service
        .list(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(classes)))
}

// GET /api/classes/by_professional
#[utoipa::path(
    get,
    path = "/api/classes/by_professional",
    tag = "Classes",
    params(
        ProfessionalQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Aulas do profissional", body = Vec<ClassDetail>),
        (status = 400, description = "professional_id em falta"),
        (status = 404, description = "Não é profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn classes_by_professional(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ProfessionalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = app_state
        .class_service
        .by_professional(tenant.0, query.professional_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(classes)))
}

// POST /api/classes
#[utoipa::path(
    post,
    path = "/api/classes",
    tag = "Classes",
    request_body = CreateClassPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Aula criada", body = ClassDetail),
        (status = 400, description = "Lotação excedida ou dados inválidos"),
        (status = 409, description = "Nome duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let class = app_state
        .class_service
        .create(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(class)))
}

// GET /api/classes/{id}
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    tag = "Classes",
    params(
        ("id" = Uuid, Path, description = "ID da aula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Aula", body = ClassDetail),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let class = app_state
        .class_service
        .get(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(class)))
}

// PUT /api/classes/{id}
#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    tag = "Classes",
    request_body = UpdateClassPayload,
    params(
        ("id" = Uuid, Path, description = "ID da aula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Aula atualizada", body = ClassDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let class = app_state
        .class_service
        .update(tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(class)))
}

// POST /api/classes/{id}/toggle_status
#[utoipa::path(
    post,
    path = "/api/classes/{id}/toggle_status",
    tag = "Classes",
    params(
        ("id" = Uuid, Path, description = "ID da aula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Estado invertido", body = ClassDetail)),
    security(("api_jwt" = []))
)]
pub async fn toggle_class_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let class = app_state
        .class_service
        .toggle_status(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(class)))
}

// DELETE /api/classes/{id}
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    tag = "Classes",
    params(
        ("id" = Uuid, Path, description = "ID da aula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Aula removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_class(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .class_service
        .delete(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
