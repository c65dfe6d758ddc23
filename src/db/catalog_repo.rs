// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::catalog::{Category, CreateServicePayload, Service, UpdateServicePayload},
};

const SERVICE_COLUMNS: &str = r#"
    id, tenant_id, name, reference, category_id, duration, rate, price, show_online,
    created_at, updated_at
"#;

fn to_money(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default().round_dp(2)
}

fn duplicate_reference() -> String {
    "A service with this reference already exists.".to_string()
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, tenant_id, name, status, created_at, updated_at
            FROM categories WHERE tenant_id = $1
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, tenant_id, name, status, created_at, updated_at
            FROM categories WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn create_category(
        &self,
        tenant_id: Uuid,
        name: &str,
        status: bool,
    ) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (tenant_id, name, status)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, name, status, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        name: &str,
        status: bool,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $3, status = $4, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING id, tenant_id, name, status, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(name)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Category"))
    }

    pub async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category"));
        }
        Ok(())
    }

    pub async fn category_exists<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn list_services(
        &self,
        tenant_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Service>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM services
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY name
            "#,
            SERVICE_COLUMNS
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    pub async fn find_service<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM services WHERE tenant_id = $1 AND id = $2",
            SERVICE_COLUMNS
        );
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn find_services(&self, tenant_id: Uuid, ids: &[Uuid]) -> Result<Vec<Service>, AppError> {
        let sql = format!(
            "SELECT {} FROM services WHERE tenant_id = $1 AND id = ANY($2)",
            SERVICE_COLUMNS
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO services
                (tenant_id, name, reference, category_id, duration, rate, price, show_online)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        );
        sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(&payload.name)
            .bind(&payload.reference)
            .bind(payload.category_id)
            .bind(payload.duration)
            .bind(to_money(payload.rate))
            .bind(to_money(payload.price))
            .bind(payload.show_online)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_reference))
    }

    pub async fn update_service<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE services SET
                name = COALESCE($3, name),
                reference = COALESCE($4, reference),
                category_id = COALESCE($5, category_id),
                duration = COALESCE($6, duration),
                rate = COALESCE($7, rate),
                price = COALESCE($8, price),
                show_online = COALESCE($9, show_online),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        );
        sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(payload.name.as_deref())
            .bind(payload.reference.as_deref())
            .bind(payload.category_id)
            .bind(payload.duration)
            .bind(payload.rate.map(to_money))
            .bind(payload.price.map(to_money))
            .bind(payload.show_online)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_reference))?
            .ok_or(AppError::NotFound("Service"))
    }

    pub async fn delete_service(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM services WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service"));
        }
        Ok(())
    }

    pub async fn collaborator_ids<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM service_collaborators WHERE service_id = $1")
                .bind(service_id)
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }

    pub async fn replace_collaborators(
        &self,
        conn: &mut PgConnection,
        service_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM service_collaborators WHERE service_id = $1")
            .bind(service_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO service_collaborators (service_id, user_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(service_id)
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
