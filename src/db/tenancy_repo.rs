// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::Role,
        tenancy::{Membership, Tenant, UserTenant},
    },
};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca a associação do utilizador ao tenant.
    /// Esta é a verificação de segurança de autorização mais importante.
    pub async fn find_membership(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT tenant_id, user_id, role, is_active, remaining_hours, joined_at
            FROM tenant_members
            WHERE user_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Cria um novo tenant (Estabelecimento) na base de dados.
    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO tenant_members (tenant_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .execute(executor)
        .await
        .map_err(|e| {
            crate::common::error::map_unique_violation(e, || {
                "This user is already a member of this tenant.".to_string()
            })
        })?;

        Ok(())
    }

    pub async fn user_has_tenant_with_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tenants t
                JOIN tenant_members m ON m.tenant_id = t.id
                WHERE m.user_id = $1 AND m.role = 'admin' AND lower(t.name) = lower($2)
            )
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn get_tenants_for_user(&self, user_id: Uuid) -> Result<Vec<UserTenant>, AppError> {
        let tenants = sqlx::query_as::<_, UserTenant>(
            r#"
            SELECT t.id, t.name, t.description, m.role, m.is_active
            FROM tenants t
            JOIN tenant_members m ON m.tenant_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }
}
