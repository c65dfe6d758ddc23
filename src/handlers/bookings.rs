// src/handlers/bookings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::CurrentMembership,
        i18n::Locale,
        rbac::{AdminOrProfessional, RequireRole},
        tenancy::TenantContext,
    },
    models::booking::{
        AvailableSlots, BookingDetail, BookingListQuery, BookingState, CalendarQuery,
        CreateBookingPayload, SlotQuery, UpdateBookingPayload,
    },
};

// =============================================================================
//  ÁREA 1: CONSULTAS
// =============================================================================

// GET /api/reservations
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    params(
        BookingListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Reservas futuras primeiro", body = Vec<BookingDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_bookings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = app_state
        .booking_service
        .list(tenant.0, &member, &query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(bookings)))
}

// GET /api/reservations/filter_reservations
#[utoipa::path(
    get,
    path = "/api/reservations/filter_reservations",
    tag = "Reservations",
    params(
        CalendarQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Reservas do período", body = Vec<BookingDetail>),
        (status = 400, description = "Formato de mês, semana, dia ou estado inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn filter_bookings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = app_state
        .booking_service
        .calendar(tenant.0, &member, &query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(bookings)))
}

// GET /api/reservations/available_slots
#[utoipa::path(
    get,
    path = "/api/reservations/available_slots",
    tag = "Reservations",
    params(
        SlotQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Janelas livres do profissional", body = AvailableSlots),
        (status = 400, description = "Parâmetros em falta ou serviço desconhecido"),
        (status = 404, description = "Não é profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn available_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<SlotQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let slots = app_state
        .booking_service
        .available_slots(tenant.0, &query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(slots)))
}

// GET /api/reservations/{id}
#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(
        ("id" = Uuid, Path, description = "ID da reserva"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Reserva", body = BookingDetail),
        (status = 403, description = "Reserva de outro profissional"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .get(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// =============================================================================
//  ÁREA 2: ESCRITA
// =============================================================================

// POST /api/reservations
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = CreateBookingPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Reserva criada", body = BookingDetail),
        (status = 400, description = "Validação falhou ou sem horas disponíveis"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    _staff: RequireRole<AdminOrProfessional>,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .create(tenant.0, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// PUT /api/reservations/{id}
#[utoipa::path(
    put,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    request_body = UpdateBookingPayload,
    params(
        ("id" = Uuid, Path, description = "ID da reserva"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Reserva atualizada", body = BookingDetail)),
    security(("api_jwt" = []))
)]
pub async fn update_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    _staff: RequireRole<AdminOrProfessional>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .update(tenant.0, &member, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// DELETE /api/reservations/{id}
#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(
        ("id" = Uuid, Path, description = "ID da reserva"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Reserva removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    _staff: RequireRole<AdminOrProfessional>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .booking_service
        .delete(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/reservations/{id}/approve
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/approve",
    tag = "Reservations",
    params(
        ("id" = Uuid, Path, description = "ID da reserva"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Reserva confirmada", body = BookingDetail),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    _staff: RequireRole<AdminOrProfessional>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .set_state(tenant.0, &member, id, BookingState::Confirmed)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// POST /api/reservations/{id}/reject
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/reject",
    tag = "Reservations",
    params(
        ("id" = Uuid, Path, description = "ID da reserva"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Reserva cancelada", body = BookingDetail),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    _staff: RequireRole<AdminOrProfessional>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .set_state(tenant.0, &member, id, BookingState::Cancel)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}
