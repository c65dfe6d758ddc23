// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::Role, dashboard::BookingTotals},
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Contadores de reservas; as janelas contam pela data da reserva,
    /// de cada corte em diante (reservas futuras incluídas).
    /// Retorna também o total de clientes e de profissionais.
    pub async fn get_totals<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        cutoffs: [NaiveDate; 3],
    ) -> Result<(BookingTotals, i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente dos contadores
        let mut tx = executor.begin().await?;

        let bookings = sqlx::query_as::<_, BookingTotals>(
            r#"
            SELECT
                COUNT(*) AS total_reservations,
                COUNT(*) FILTER (WHERE state = 'confirmed') AS confirmed_reservations,
                COUNT(*) FILTER (WHERE state = 'cancel') AS cancelled_reservations,
                COUNT(*) FILTER (WHERE state = 'confirmed' AND date >= $2) AS confirmed_last_7_days,
                COUNT(*) FILTER (WHERE state = 'confirmed' AND date >= $3) AS confirmed_last_30_days,
                COUNT(*) FILTER (WHERE state = 'confirmed' AND date >= $4) AS confirmed_last_90_days
            FROM bookings
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .bind(cutoffs[0])
        .bind(cutoffs[1])
        .bind(cutoffs[2])
        .fetch_one(&mut *tx)
        .await?;

        let total_clients: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&mut *tx)
                .await?;

        let total_professionals: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tenant_members WHERE tenant_id = $1 AND role = $2",
        )
        .bind(tenant_id)
        .bind(Role::Professional)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((bookings, total_clients, total_professionals))
    }

    /// Profissionais que entraram por dia, a partir de `since` (inclusive).
    pub async fn professionals_joined_since<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT joined_at::date AS day, COUNT(*)
            FROM tenant_members
            WHERE tenant_id = $1 AND role = 'professional' AND joined_at::date >= $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Clientes que entraram por dia, a partir de `since` (inclusive).
    pub async fn clients_joined_since<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT joined_at::date AS day, COUNT(*)
            FROM customers
            WHERE tenant_id = $1 AND joined_at::date >= $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
