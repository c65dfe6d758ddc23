// src/db/customer_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, UpdateCustomerPayload},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista clientes; com `professional_id` apenas os vinculados a ele.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT c.id, c.tenant_id, c.full_name, c.email, c.contact_number, c.joined_at
            FROM customers c
            WHERE c.tenant_id = $1
              AND ($2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM customer_professionals cp
                    WHERE cp.customer_id = c.id AND cp.professional_id = $2
              ))
            ORDER BY c.joined_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, full_name, email, contact_number, joined_at
            FROM customers
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, full_name, email, contact_number, joined_at
            FROM customers
            WHERE tenant_id = $1 AND id = ANY($2)
            ORDER BY full_name
            "#,
        )
        .bind(tenant_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(customers)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        full_name: &str,
        email: &str,
        contact_number: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (tenant_id, full_name, email, contact_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, full_name, email, contact_number, joined_at
            "#,
        )
        .bind(tenant_id)
        .bind(full_name)
        .bind(email)
        .bind(contact_number)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                full_name = COALESCE($3, full_name),
                email = COALESCE($4, email),
                contact_number = COALESCE($5, contact_number)
            WHERE tenant_id = $1 AND id = $2
            RETURNING id, tenant_id, full_name, email, contact_number, joined_at
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(payload.full_name.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.contact_number.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Client"))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client"));
        }
        Ok(())
    }

    pub async fn professional_ids<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT professional_id FROM customer_professionals WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn is_linked<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        professional_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM customer_professionals
                WHERE customer_id = $1 AND professional_id = $2
            )
            "#,
        )
        .bind(customer_id)
        .bind(professional_id)
        .fetch_one(executor)
        .await?;
        Ok(linked)
    }

    pub async fn replace_professionals(
        &self,
        conn: &mut PgConnection,
        customer_id: Uuid,
        professional_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM customer_professionals WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO customer_professionals (customer_id, professional_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(customer_id)
        .bind(professional_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
