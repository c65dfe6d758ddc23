// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::{auth::Role, tenancy::Membership},
};

/// 1. O Trait que define quais papéis passam
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn description() -> &'static str;
}

/// 2. O Extractor (Guardião). Depende do Membership posto pelo tenant_guard.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let membership = parts
            .extensions
            .get::<Membership>()
            .ok_or(AppError::TenantAccessDenied)?;

        if !T::allows(membership.role) {
            return Err(AppError::Forbidden(format!(
                "This action requires the {} role.",
                T::description()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
    fn description() -> &'static str {
        "admin"
    }
}

pub struct AdminOrProfessional;
impl RoleDef for AdminOrProfessional {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Professional)
    }
    fn description() -> &'static str {
        "admin or professional"
    }
}

pub struct ProfessionalOnly;
impl RoleDef for ProfessionalOnly {
    fn allows(role: Role) -> bool {
        role == Role::Professional
    }
    fn description() -> &'static str {
        "professional"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn parts_with(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(role) = role {
            parts.extensions.insert(Membership {
                tenant_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                role,
                is_active: true,
                remaining_hours: Decimal::ZERO,
                joined_at: Utc::now(),
            });
        }
        parts
    }

    #[tokio::test]
    async fn admin_passes_admin_only() {
        let mut parts = parts_with(Some(Role::Admin));
        assert!(RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn collaborator_is_forbidden() {
        let mut parts = parts_with(Some(Role::Collaborator));
        let result = RequireRole::<AdminOrProfessional>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn missing_membership_is_denied() {
        let mut parts = parts_with(None);
        let result = RequireRole::<ProfessionalOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::TenantAccessDenied)));
    }

    #[tokio::test]
    async fn professional_passes_staff_gate_but_admin_cannot_subscribe() {
        let mut parts = parts_with(Some(Role::Professional));
        assert!(RequireRole::<AdminOrProfessional>::from_request_parts(&mut parts, &()).await.is_ok());

        let mut parts = parts_with(Some(Role::Admin));
        let result = RequireRole::<ProfessionalOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
