// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// UUID do estabelecimento que o utilizador quer aceder.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let value = headers
            .get(TENANT_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest("The x-tenant-id header is required.".to_string()))?;

        let value = value.to_str().map_err(|_| {
            AppError::BadRequest("The x-tenant-id header contains invalid characters.".to_string())
        })?;

        Uuid::parse_str(value.trim())
            .map(TenantContext)
            .map_err(|_| AppError::BadRequest("The x-tenant-id header is not a valid UUID.".to_string()))
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // tenant_guard já validou e guardou; sem ele, lê o cabeçalho
        if let Some(tenant) = parts.extensions.get::<TenantContext>() {
            return Ok(*tenant);
        }
        Self::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, id.to_string().parse().unwrap());
        assert_eq!(TenantContext::from_headers(&headers).unwrap().0, id);
    }

    #[test]
    fn missing_or_malformed_header_is_bad_request() {
        assert!(matches!(
            TenantContext::from_headers(&HeaderMap::new()),
            Err(AppError::BadRequest(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, "estudio-1".parse().unwrap());
        assert!(matches!(
            TenantContext::from_headers(&headers),
            Err(AppError::BadRequest(_))
        ));
    }
}
