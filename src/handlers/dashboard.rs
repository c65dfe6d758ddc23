// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid; // Importante para o Swagger params

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::dashboard::DashboardAnalytics,
};

// GET /api/dashboard/analytics
#[utoipa::path(
    get,
    path = "/api/dashboard/analytics",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais de reservas e séries de adesão (7/30/90 dias)", body = DashboardAnalytics),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas admin")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let analytics = app_state
        .dashboard_service
        .analytics(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(analytics)))
}
