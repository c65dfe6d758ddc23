// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{auth::User, tenancy::Membership},
};

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// Vínculo do usuário com o tenant do pedido (papel, estado, saldo)
#[derive(Debug, Clone)]
pub struct CurrentMembership(pub Membership);

impl<S> FromRequestParts<S> for CurrentMembership
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Membership>()
            .cloned()
            .map(CurrentMembership)
            .ok_or(AppError::TenantAccessDenied)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .ok_or(AppError::InvalidToken)
}

// Rotas que só exigem login
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).map_err(|e| e.to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .validate_token(&token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Rotas de um estabelecimento: login + x-tenant-id + membro ativo.
// Token e cabeçalho são verificados antes de qualquer acesso ao banco.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).map_err(|e| e.to_api_error(&locale))?;
    let claims = app_state
        .auth_service
        .decode_claims(&token)
        .map_err(|e| e.to_api_error(&locale))?;
    let tenant = TenantContext::from_headers(request.headers()).map_err(|e| e.to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .user_for_claims(&claims)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let membership = app_state
        .tenant_service
        .find_membership(user.id, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?
        .ok_or_else(|| AppError::TenantAccessDenied.to_api_error(&locale))?;

    if !membership.is_active {
        tracing::warn!("🚫 Membro inativo {} tentou aceder ao tenant {}", user.id, tenant.0);
        return Err(AppError::Forbidden(
            "Your membership in this tenant is not active.".to_string(),
        )
        .to_api_error(&locale));
    }

    let extensions = request.extensions_mut();
    extensions.insert(AuthenticatedUser(user));
    extensions.insert(tenant);
    extensions.insert(membership);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn reads_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_basic_auth_is_rejected() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AppError::InvalidToken)));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
