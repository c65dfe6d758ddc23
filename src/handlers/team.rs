// src/handlers/team.rs

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
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::{
        availability::WeeklyAvailability,
        team::{CreateMemberPayload, TeamFilter, TeamMember, TeamMemberDetail, UpdateMemberPayload},
    },
};

// GET /api/team
#[utoipa::path(
    get,
    path = "/api/team",
    tag = "Team",
    params(
        TeamFilter,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Membros, mais recentes primeiro", body = Vec<TeamMember>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Query(filter): Query<TeamFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .team_service
        .list_members(tenant.0, filter.role)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(members)))
}

// POST /api/team
#[utoipa::path(
    post,
    path = "/api/team",
    tag = "Team",
    request_body = CreateMemberPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Membro criado", body = TeamMemberDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Json(payload): Json<CreateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let member = app_state
        .team_service
        .create_member(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(member)))
}

// GET /api/team/{user_id}
#[utoipa::path(
    get,
    path = "/api/team/{user_id}",
    tag = "Team",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Membro", body = TeamMemberDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .team_service
        .get_member(tenant.0, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

// PUT /api/team/{user_id}
#[utoipa::path(
    put,
    path = "/api/team/{user_id}",
    tag = "Team",
    request_body = UpdateMemberPayload,
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Membro atualizado", body = TeamMemberDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let member = app_state
        .team_service
        .update_member(tenant.0, user_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

// DELETE /api/team/{user_id}
#[utoipa::path(
    delete,
    path = "/api/team/{user_id}",
    tag = "Team",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Membro removido do estabelecimento")),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .team_service
        .remove_member(tenant.0, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/team/{user_id}/approve
#[utoipa::path(
    post,
    path = "/api/team/{user_id}/approve",
    tag = "Team",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Membro ativado", body = TeamMember)),
    security(("api_jwt" = []))
)]
pub async fn approve_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .team_service
        .set_active(tenant.0, user_id, true)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

// POST /api/team/{user_id}/cancel
#[utoipa::path(
    post,
    path = "/api/team/{user_id}/cancel",
    tag = "Team",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Membro desativado", body = TeamMember)),
    security(("api_jwt" = []))
)]
pub async fn cancel_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .team_service
        .set_active(tenant.0, user_id, false)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

// GET /api/team/{user_id}/timeslots
#[utoipa::path(
    get,
    path = "/api/team/{user_id}/timeslots",
    tag = "Team",
    params(
        ("user_id" = Uuid, Path, description = "ID do profissional"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Disponibilidade semanal", body = WeeklyAvailability),
        (status = 404, description = "Não é profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_timeslots(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let availability = app_state
        .team_service
        .get_timeslots(tenant.0, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(availability)))
}

// PUT /api/team/{user_id}/timeslots
#[utoipa::path(
    put,
    path = "/api/team/{user_id}/timeslots",
    tag = "Team",
    request_body = WeeklyAvailability,
    params(
        ("user_id" = Uuid, Path, description = "ID do profissional"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Disponibilidade substituída", body = WeeklyAvailability),
        (status = 400, description = "Horários inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_timeslots(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
    Json(availability): Json<WeeklyAvailability>,
) -> Result<impl IntoResponse, ApiError> {
    let availability = app_state
        .team_service
        .update_timeslots(tenant.0, user_id, &availability)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(availability)))
}
