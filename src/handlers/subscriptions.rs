// src/handlers/subscriptions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Form, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, CurrentMembership},
        i18n::Locale,
        rbac::{AdminOnly, ProfessionalOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::subscription::{
        CreatePackPayload, CreditCardCallbackParams, MbwayStatusResponse, Order, Pack,
        PaymentCallbackParams, SubscribePayload, SubscribeResponse, UpdatePackPayload,
    },
    services::subscription_service::PaymentPage,
};

// =============================================================================
//  ÁREA 1: PACOTES
// =============================================================================

// GET /api/subscriptions/packs
#[utoipa::path(
    get,
    path = "/api/subscriptions/packs",
    tag = "Subscriptions",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Pacotes (só ativos para não-admin)", body = Vec<Pack>)),
    security(("api_jwt" = []))
)]
pub async fn list_packs(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
) -> Result<impl IntoResponse, ApiError> {
    let packs = app_state
        .subscription_service
        .list_packs(tenant.0, &member)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(packs)))
}

// GET /api/subscriptions/packs/{id}
#[utoipa::path(
    get,
    path = "/api/subscriptions/packs/{id}",
    tag = "Subscriptions",
    params(
        ("id" = Uuid, Path, description = "ID do pacote"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Pacote", body = Pack),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pack(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pack = app_state
        .subscription_service
        .get_pack(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(pack)))
}

// POST /api/subscriptions/packs
#[utoipa::path(
    post,
    path = "/api/subscriptions/packs",
    tag = "Subscriptions",
    request_body = CreatePackPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Pacote criado", body = Pack),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pack(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Json(payload): Json<CreatePackPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let pack = app_state
        .subscription_service
        .create_pack(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(pack)))
}

// PUT /api/subscriptions/packs/{id}
#[utoipa::path(
    put,
    path = "/api/subscriptions/packs/{id}",
    tag = "Subscriptions",
    request_body = UpdatePackPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pacote"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 200, description = "Pacote atualizado", body = Pack)),
    security(("api_jwt" = []))
)]
pub async fn update_pack(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePackPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let pack = app_state
        .subscription_service
        .update_pack(tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(pack)))
}

// DELETE /api/subscriptions/packs/{id}
#[utoipa::path(
    delete,
    path = "/api/subscriptions/packs/{id}",
    tag = "Subscriptions",
    params(
        ("id" = Uuid, Path, description = "ID do pacote"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses((status = 204, description = "Pacote removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_pack(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .subscription_service
        .delete_pack(tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: SUBSCRIÇÃO E ENCOMENDAS
// =============================================================================

// POST /api/subscriptions/subscribe
#[utoipa::path(
    post,
    path = "/api/subscriptions/subscribe",
    tag = "Subscriptions",
    request_body = SubscribePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Encomenda criada com instruções de pagamento", body = SubscribeResponse),
        (status = 400, description = "Pacote inativo, método inválido ou telemóvel em falta"),
        (status = 403, description = "Apenas profissionais"),
        (status = 500, description = "Falha no gateway")
    ),
    security(("api_jwt" = []))
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _professional: RequireRole<ProfessionalOnly>,
    AuthenticatedUser(user): AuthenticatedUser,
    CurrentMembership(member): CurrentMembership,
    Json(payload): Json<SubscribePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .subscription_service
        .subscribe(tenant.0, &member, &user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/subscriptions/orders
#[utoipa::path(
    get,
    path = "/api/subscriptions/orders",
    tag = "Subscriptions",
    params(("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")),
    responses((status = 200, description = "Encomendas (admin vê todas)", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .subscription_service
        .list_orders(tenant.0, &member)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/subscriptions/orders/{id}
#[utoipa::path(
    get,
    path = "/api/subscriptions/orders/{id}",
    tag = "Subscriptions",
    params(
        ("id" = Uuid, Path, description = "ID da encomenda"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Encomenda", body = Order),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .subscription_service
        .get_order(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}

// GET /api/subscriptions/orders/{id}/mbway_status
#[utoipa::path(
    get,
    path = "/api/subscriptions/orders/{id}/mbway_status",
    tag = "Subscriptions",
    params(
        ("id" = Uuid, Path, description = "ID da encomenda"),
        ("x-tenant-id" = Uuid, Header, description = "ID do estabelecimento")
    ),
    responses(
        (status = 200, description = "Estado do pedido MB WAY", body = MbwayStatusResponse),
        (status = 400, description = "Não é MB WAY ou sem requestId"),
        (status = 403, description = "Encomenda de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_mbway_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    CurrentMembership(member): CurrentMembership,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .subscription_service
        .check_mbway_status(tenant.0, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(status)))
}

// =============================================================================
//  ÁREA 3: CALLBACKS DO GATEWAY (públicos, GET ou POST)
// =============================================================================

// O gateway só olha para o status; o corpo é texto simples.
fn callback_failure(e: AppError) -> (StatusCode, String) {
    match &e {
        AppError::BadRequest(message) | AppError::Forbidden(message) => {
            (e.status_code(), message.clone())
        }
        AppError::NotFound("Order") => (StatusCode::NOT_FOUND, "Order not found".to_string()),
        other => {
            tracing::error!("❌ Erro no callback de pagamento: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}

async fn ifthenpay_callback(app_state: AppState, params: PaymentCallbackParams) -> impl IntoResponse {
    tracing::info!("🔔 Callback IfThenPay recebido: {:?}", params);
    match app_state.subscription_service.handle_callback(&params).await {
        Ok(()) => (StatusCode::OK, "OK".to_string()),
        Err(e) => callback_failure(e),
    }
}

// GET /api/subscriptions/callback/ifthenpay
#[utoipa::path(
    get,
    path = "/api/subscriptions/callback/ifthenpay",
    tag = "Payment callbacks",
    params(PaymentCallbackParams),
    responses(
        (status = 200, description = "OK (também quando já estava pago)"),
        (status = 400, description = "Parâmetros em falta"),
        (status = 404, description = "Encomenda desconhecida")
    )
)]
pub async fn ifthenpay_callback_get(
    State(app_state): State<AppState>,
    Query(params): Query<PaymentCallbackParams>,
) -> impl IntoResponse {
    ifthenpay_callback(app_state, params).await
}

// POST /api/subscriptions/callback/ifthenpay
#[utoipa::path(
    post,
    path = "/api/subscriptions/callback/ifthenpay",
    tag = "Payment callbacks",
    request_body(content_type = "application/x-www-form-urlencoded", description = "Mesmos campos do GET"),
    responses((status = 200, description = "OK"))
)]
pub async fn ifthenpay_callback_post(
    State(app_state): State<AppState>,
    Form(params): Form<PaymentCallbackParams>,
) -> impl IntoResponse {
    ifthenpay_callback(app_state, params).await
}

async fn creditcard_success(app_state: AppState, params: CreditCardCallbackParams) -> impl IntoResponse {
    tracing::info!("💳 Retorno de sucesso do cartão: {:?}", params.id);
    let service = &app_state.subscription_service;
    match service.creditcard_success(&params).await {
        Ok(order) => {
            let page = PaymentPage::Confirmed {
                order_id: order.order_id,
                amount: order.amount,
            };
            Html(page.render(service.frontend_url())).into_response()
        }
        Err(e) => callback_failure(e).into_response(),
    }
}

async fn creditcard_cancelled(
    app_state: AppState,
    params: CreditCardCallbackParams,
    page: PaymentPage,
) -> impl IntoResponse {
    tracing::info!("💳 Retorno sem pagamento do cartão ({:?}): {:?}", page, params.id);
    let service = &app_state.subscription_service;
    match service.creditcard_cancelled(params.id.as_deref()).await {
        Ok(()) => Html(page.render(service.frontend_url())).into_response(),
        Err(e) => callback_failure(e).into_response(),
    }
}

// GET /api/subscriptions/callback/creditcard/success
#[utoipa::path(
    get,
    path = "/api/subscriptions/callback/creditcard/success",
    tag = "Payment callbacks",
    params(CreditCardCallbackParams),
    responses(
        (status = 200, description = "Página HTML de confirmação", content_type = "text/html"),
        (status = 403, description = "Assinatura inválida"),
        (status = 404, description = "Encomenda desconhecida")
    )
)]
pub async fn creditcard_success_get(
    State(app_state): State<AppState>,
    Query(params): Query<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_success(app_state, params).await
}

pub async fn creditcard_success_post(
    State(app_state): State<AppState>,
    Form(params): Form<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_success(app_state, params).await
}

// GET /api/subscriptions/callback/creditcard/error
#[utoipa::path(
    get,
    path = "/api/subscriptions/callback/creditcard/error",
    tag = "Payment callbacks",
    params(CreditCardCallbackParams),
    responses((status = 200, description = "Página HTML de erro", content_type = "text/html"))
)]
pub async fn creditcard_error_get(
    State(app_state): State<AppState>,
    Query(params): Query<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_cancelled(app_state, params, PaymentPage::Failed).await
}

pub async fn creditcard_error_post(
    State(app_state): State<AppState>,
    Form(params): Form<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_cancelled(app_state, params, PaymentPage::Failed).await
}

// GET /api/subscriptions/callback/creditcard/cancel
#[utoipa::path(
    get,
    path = "/api/subscriptions/callback/creditcard/cancel",
    tag = "Payment callbacks",
    params(CreditCardCallbackParams),
    responses((status = 200, description = "Página HTML de cancelamento", content_type = "text/html"))
)]
pub async fn creditcard_cancel_get(
    State(app_state): State<AppState>,
    Query(params): Query<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_cancelled(app_state, params, PaymentPage::Cancelled).await
}

pub async fn creditcard_cancel_post(
    State(app_state): State<AppState>,
    Form(params): Form<CreditCardCallbackParams>,
) -> impl IntoResponse {
    creditcard_cancelled(app_state, params, PaymentPage::Cancelled).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_failures_keep_status_and_hide_internals() {
        let (status, body) = callback_failure(AppError::NotFound("Order"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Order not found");

        let (status, body) = callback_failure(AppError::BadRequest("Missing parameters".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Missing parameters");

        let (status, body) = callback_failure(AppError::PaymentGateway("boom".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");

        // Vínculo removido antes do crédito: a transação é desfeita e o gateway recebe 500
        let (status, body) = callback_failure(AppError::NotFound("Member"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }
}
