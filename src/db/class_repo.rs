// src/db/class_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::class::{Class, UpdateClassPayload},
};

const CLASS_COLUMNS: &str =
    "id, tenant_id, name, description, duration, capacity, status, created_at, updated_at";

fn duplicate_name() -> String {
    "A class with this name already exists.".to_string()
}

#[derive(Clone)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Com `professional_id`, só as aulas em que ele leciona.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<Class>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM classes c
            WHERE c.tenant_id = $1
              AND ($2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM class_professionals cp
                    WHERE cp.class_id = c.id AND cp.user_id = $2
              ))
            ORDER BY c.created_at DESC
            "#,
            CLASS_COLUMNS
        );
        let classes = sqlx::query_as::<_, Class>(&sql)
            .bind(tenant_id)
            .bind(professional_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Class>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM classes WHERE tenant_id = $1 AND id = $2",
            CLASS_COLUMNS
        );
        let class = sqlx::query_as::<_, Class>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(class)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        description: &str,
        duration: i32,
        capacity: i32,
    ) -> Result<Class, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO classes (tenant_id, name, description, duration, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CLASS_COLUMNS
        );
        sqlx::query_as::<_, Class>(&sql)
            .bind(tenant_id)
            .bind(name)
            .bind(description)
            .bind(duration)
            .bind(capacity)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_name))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateClassPayload,
    ) -> Result<Class, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE classes SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                duration = COALESCE($5, duration),
                capacity = COALESCE($6, capacity),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            CLASS_COLUMNS
        );
        sqlx::query_as::<_, Class>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(payload.name.as_deref())
            .bind(payload.description.as_deref())
            .bind(payload.duration)
            .bind(payload.capacity)
            .bind(payload.status)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_name))?
            .ok_or(AppError::NotFound("Class"))
    }

    pub async fn set_status(&self, tenant_id: Uuid, id: Uuid, status: bool) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE classes SET status = $3, updated_at = NOW() WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Class"));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classes WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Class"));
        }
        Ok(())
    }

    pub async fn professional_ids<'e, E>(&self, executor: E, class_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM class_professionals WHERE class_id = $1")
                .bind(class_id)
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }

    pub async fn client_ids<'e, E>(&self, executor: E, class_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT customer_id FROM class_clients WHERE class_id = $1")
                .bind(class_id)
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }

    pub async fn replace_professionals(
        &self,
        conn: &mut PgConnection,
        class_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM class_professionals WHERE class_id = $1")
            .bind(class_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO class_professionals (class_id, user_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(class_id)
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn replace_clients(
        &self,
        conn: &mut PgConnection,
        class_id: Uuid,
        customer_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM class_clients WHERE class_id = $1")
            .bind(class_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO class_clients (class_id, customer_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(class_id)
        .bind(customer_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
