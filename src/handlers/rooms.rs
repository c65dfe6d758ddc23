// src/handlers/rooms.rs

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
    models::room::{CreateRoomPayload, RoomView, UpdateRoomPayload},
};

// GET /api/rooms
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "Rooms",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Salas, mais recentes primeiro", body = Vec<RoomView>)),
    security(("api_jwt" = []))
)]
pub async fn list_rooms(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = app_state
        .room_service
        .list(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rooms)))
}

// POST /api/rooms
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "Rooms",
    request_body = CreateRoomPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Sala criada", body = RoomView),
        (status = 409, description = "Nome duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_room(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateRoomPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let room = app_state
        .room_service
        .create(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(room)))
}

// GET /api/rooms/{id}
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(
        ("id" = Uuid, Path, description = "ID da sala"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Sala", body = RoomView),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_room(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let room = app_state
        .room_service
        .get(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(room)))
}

// PUT /api/rooms/{id}
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    request_body = UpdateRoomPayload,
    params(
        ("id" = Uuid, Path, description = "ID da sala"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Sala atualizada", body = RoomView)),
    security(("api_jwt" = []))
)]
pub async fn update_room(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoomPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let room = app_state
        .room_service
        .update(tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(room)))
}

// POST /api/rooms/{id}/toggle_status
#[utoipa::path(
    post,
    path = "/api/rooms/{id}/toggle_status",
    tag = "Rooms",
    params(
        ("id" = Uuid, Path, description = "ID da sala"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Estado invertido", body = RoomView)),
    security(("api_jwt" = []))
)]
pub async fn toggle_room_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let room = app_state
        .room_service
        .toggle_status(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(room)))
}

// DELETE /api/rooms/{id}
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(
        ("id" = Uuid, Path, description = "ID da sala"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Sala removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_room(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .room_service
        .delete(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
