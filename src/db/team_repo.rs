// src/db/team_repo.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::Role,
        availability::{AvailabilityRow, DaySchedule},
        team::{MembershipFields, TeamMember},
    },
};

const MEMBER_SELECT: &str = r#"
    SELECT
        u.id AS user_id, u.email, u.full_name, u.contact_number, u.personal_mobile, u.bio,
        m.role, m.is_active, m.collaborator_code, m.specialty, m.color_scheme,
        m.commission_executing_percent, m.commission_executing_euro,
        m.commission_responsible_percent, m.commission_responsible_euro,
        m.remaining_hours, m.joined_at
    FROM tenant_members m
    JOIN users u ON u.id = m.user_id
"#;

fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok()).map(|d| d.round_dp(2))
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

fn member_updated(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound("Member"));
    }
    Ok(())
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MEMBROS
    // =========================================================================

    pub async fn list_members(
        &self,
        tenant_id: Uuid,
        role: Option<Role>,
    ) -> Result<Vec<TeamMember>, AppError> {
        let sql = format!(
            "{} WHERE m.tenant_id = $1 AND ($2::member_role IS NULL OR m.role = $2) ORDER BY m.joined_at DESC",
            MEMBER_SELECT
        );
        let members = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(tenant_id)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    pub async fn find_member<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE m.tenant_id = $1 AND m.user_id = $2", MEMBER_SELECT);
        let member = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(member)
    }

    /// Confirma que o id pertence a um profissional deste tenant.
    pub async fn is_professional<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tenant_members
                WHERE tenant_id = $1 AND user_id = $2 AND role = 'professional'
            )
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Subconjunto de `user_ids` que são profissionais do tenant.
    pub async fn filter_professionals<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM tenant_members
            WHERE tenant_id = $1 AND role = 'professional' AND user_id = ANY($2)
            "#,
        )
        .bind(tenant_id)
        .bind(user_ids)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn update_membership<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        role: Option<Role>,
        fields: &MembershipFields,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tenant_members SET
                role = COALESCE($3, role),
                collaborator_code = COALESCE($4, collaborator_code),
                specialty = COALESCE($5, specialty),
                color_scheme = COALESCE($6, color_scheme),
                commission_executing_percent = COALESCE($7, commission_executing_percent),
                commission_executing_euro = COALESCE($8, commission_executing_euro),
                commission_responsible_percent = COALESCE($9, commission_responsible_percent),
                commission_responsible_euro = COALESCE($10, commission_responsible_euro)
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .bind(fields.collaborator_code.as_deref())
        .bind(fields.specialty.as_deref())
        .bind(fields.color_scheme.as_deref())
        .bind(to_decimal(fields.commission_executing_percent))
        .bind(to_decimal(fields.commission_executing_euro))
        .bind(to_decimal(fields.commission_responsible_percent))
        .bind(to_decimal(fields.commission_responsible_euro))
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member"));
        }
        Ok(())
    }

    pub async fn set_active(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE tenant_members SET is_active = $3 WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member"));
        }
        Ok(())
    }

    pub async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tenant_members WHERE tenant_id = $1 AND user_id = $2")
            .bind(tenant_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member"));
        }
        Ok(())
    }

    // =========================================================================
    //  SALDO DE HORAS
    // =========================================================================

    /// Desconta uma hora se houver saldo. Retorna false quando não há.
    pub async fn consume_hour<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tenant_members
            SET remaining_hours = remaining_hours - 1
            WHERE tenant_id = $1 AND user_id = $2 AND remaining_hours >= 1
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Credita horas; falha se o vínculo já não existir, para desfazer a transação.
    pub async fn add_hours<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        hours: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tenant_members
            SET remaining_hours = remaining_hours + $3
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(Decimal::from(hours))
        .execute(executor)
        .await?;
        member_updated(result.rows_affected())
    }

    // =========================================================================
    //  DISPONIBILIDADE SEMANAL
    // =========================================================================

    pub async fn get_availability<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<AvailabilityRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT weekday, enabled, start_time, break_from, break_to, end_time
            FROM weekly_availability
            WHERE tenant_id = $1 AND user_id = $2
            ORDER BY weekday
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_day<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        day: &DaySchedule,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO weekly_availability
                (tenant_id, user_id, weekday, enabled, start_time, break_from, break_to, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tenant_id, user_id, weekday) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                start_time = EXCLUDED.start_time,
                break_from = EXCLUDED.break_from,
                break_to = EXCLUDED.break_to,
                end_time = EXCLUDED.end_time
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(weekday)
        .bind(day.enabled)
        .bind(day.start)
        .bind(day.break_from)
        .bind(day.break_to)
        .bind(day.end)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  VÍNCULOS (clientes e serviços do profissional)
    // =========================================================================

    pub async fn customer_ids<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT customer_id FROM customer_professionals WHERE professional_id = $1",
        )
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Substitui os clientes do profissional pelos ids dados (apenas os deste tenant).
    pub async fn replace_customers(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        professional_id: Uuid,
        customer_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            DELETE FROM customer_professionals cp
            USING customers c
            WHERE cp.customer_id = c.id AND c.tenant_id = $1 AND cp.professional_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(professional_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO customer_professionals (customer_id, professional_id)
            SELECT c.id, $2 FROM customers c
            WHERE c.tenant_id = $1 AND c.id = ANY($3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(tenant_id)
        .bind(professional_id)
        .bind(customer_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// category_id -> [service_id] dos serviços em que o profissional colabora.
    pub async fn services_by_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<HashMap<Uuid, Vec<Uuid>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT s.category_id, s.id
            FROM service_collaborators sc
            JOIN services s ON s.id = sc.service_id
            WHERE s.tenant_id = $1 AND sc.user_id = $2 AND s.category_id IS NOT NULL
            ORDER BY s.name
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (category_id, service_id) in rows {
            grouped.entry(category_id).or_default().push(service_id);
        }
        Ok(grouped)
    }

    /// Substitui os serviços do profissional. Ids que não pertencem ao tenant
    /// (ou à categoria indicada) são ignorados.
    pub async fn replace_services(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        category_services: &HashMap<Uuid, Vec<Uuid>>,
    ) -> Result<(), AppError> {
        let mut category_ids = Vec::new();
        let mut service_ids = Vec::new();
        for (category_id, services) in category_services {
            for service_id in services {
                category_ids.push(*category_id);
                service_ids.push(*service_id);
            }
        }

        sqlx::query(
            r#"
            DELETE FROM service_collaborators sc
            USING services s
            WHERE sc.service_id = s.id AND s.tenant_id = $1 AND sc.user_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO service_collaborators (service_id, user_id)
            SELECT s.id, $2
            FROM UNNEST($3::uuid[], $4::uuid[]) AS wanted(category_id, service_id)
            JOIN services s ON s.id = wanted.service_id AND s.category_id = wanted.category_id
            WHERE s.tenant_id = $1
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(&category_ids)
        .bind(&service_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crediting_a_removed_member_fails() {
        assert!(matches!(member_updated(0), Err(AppError::NotFound("Member"))));
        assert!(member_updated(1).is_ok());
    }
}
