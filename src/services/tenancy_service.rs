// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::{
        auth::Role,
        tenancy::{Membership, Tenant, UserTenant},
    },
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    pool: PgPool,
}

impl TenantService {
    pub fn new(tenant_repo: TenantRepository, pool: PgPool) -> Self {
        Self { tenant_repo, pool }
    }

    /// Cria o estabelecimento e, na mesma transação, torna o criador admin.
    pub async fn create_tenant_with_admin(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Tenant, AppError> {
        let already_exists = self
            .tenant_repo
            .user_has_tenant_with_name(owner_id, name)
            .await?;

        if already_exists {
            return Err(AppError::UniqueConstraintViolation(format!(
                "You already have a tenant named '{}'.",
                name
            )));
        }

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenant_repo
            .create_tenant(&mut *tx, name, description)
            .await?;

        self.tenant_repo
            .add_member(&mut *tx, tenant.id, owner_id, Role::Admin)
            .await?;

        tx.commit().await?;

        tracing::info!("🏢 Estabelecimento {} criado por {}", tenant.id, owner_id);
        Ok(tenant)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserTenant>, AppError> {
        self.tenant_repo.get_tenants_for_user(user_id).await
    }

    pub async fn find_membership(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        self.tenant_repo.find_membership(user_id, tenant_id).await
    }
}
