// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, UpdateProfilePayload, User},
        tenancy::UserTenant,
    },
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Conta criada", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state
        .auth_service
        .register_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /api/users/me
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .update_profile(user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/users/me
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 204, description = "Conta removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .delete_account(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/users/me/tenants
#[utoipa::path(
    get,
    path = "/api/users/me/tenants",
    tag = "Users",
    responses((status = 200, description = "Estabelecimentos do usuário", body = Vec<UserTenant>)),
    security(("api_jwt" = []))
)]
pub async fn get_my_tenants(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let tenants = app_state
        .tenant_service
        .list_for_user(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tenants)))
}
