// src/db/booking_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::booking::{
        Booking, BookingDetail, BookingFilter, BookingState, BookingTarget, ClassSummary,
        CreateBookingPayload, PersonSummary, ReminderRow,
    },
};

const BOOKING_COLUMNS: &str = r#"
    b.id, b.tenant_id, b.professional_id, b.customer_id, b.class_id, b.title, b.coupon,
    b.services, b.room_equipment, b.date, b.start_time, b.end_time, b.internal_notes,
    b.treatment_record_marking, b.state, b.created_at, b.updated_at
"#;

const RETURNING_COLUMNS: &str = r#"
    id, tenant_id, professional_id, customer_id, class_id, title, coupon,
    services, room_equipment, date, start_time, end_time, internal_notes,
    treatment_record_marking, state, created_at, updated_at
"#;

// Reserva + nomes do profissional, cliente e aula (LEFT JOIN)
#[derive(Debug, FromRow)]
struct BookingRow {
    #[sqlx(flatten)]
    booking: Booking,
    professional_name: Option<String>,
    professional_email: Option<String>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    class_name: Option<String>,
}

impl From<BookingRow> for BookingDetail {
    fn from(row: BookingRow) -> Self {
        let professional_details = match (row.professional_name, row.professional_email) {
            (Some(full_name), Some(email)) => Some(PersonSummary {
                id: row.booking.professional_id,
                full_name,
                email,
            }),
            _ => None,
        };
        let customer_details = match (row.booking.customer_id, row.customer_name, row.customer_email) {
            (Some(id), Some(full_name), Some(email)) => Some(PersonSummary { id, full_name, email }),
            _ => None,
        };
        let class_details = match (row.booking.class_id, row.class_name) {
            (Some(id), Some(name)) => Some(ClassSummary { id, name }),
            _ => None,
        };
        BookingDetail {
            booking: row.booking,
            professional_details,
            customer_details,
            class_details,
        }
    }
}

fn detail_select() -> String {
    format!(
        r#"
        SELECT {},
            u.full_name AS professional_name, u.email AS professional_email,
            c.full_name AS customer_name, c.email AS customer_email,
            cl.name AS class_name
        FROM bookings b
        LEFT JOIN users u ON u.id = b.professional_id
        LEFT JOIN customers c ON c.id = b.customer_id
        LEFT JOIN classes cl ON cl.id = b.class_id
        "#,
        BOOKING_COLUMNS
    )
}

fn like_pattern(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("%{}%", v))
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca com filtros. Reservas futuras primeiro, depois por data e hora.
    pub async fn search(
        &self,
        tenant_id: Uuid,
        filter: &BookingFilter,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE b.tenant_id = $1
              AND ($2::uuid IS NULL OR b.professional_id = $2)
              AND ($3::date IS NULL OR b.date = $3)
              AND ($4::date IS NULL OR b.date >= $4)
              AND ($5::date IS NULL OR b.date <= $5)
              AND ($6::uuid IS NULL OR b.class_id = $6)
              AND ($7::text IS NULL OR b.services ILIKE $7)
              AND ($8::text IS NULL OR b.room_equipment ILIKE $8)
              AND ($9::booking_state IS NULL OR b.state = $9)
            ORDER BY (b.date < CURRENT_DATE) ASC, b.date ASC NULLS LAST, b.start_time ASC NULLS LAST
            "#,
            detail_select()
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(tenant_id)
            .bind(filter.professional_id)
            .bind(filter.date)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(filter.class_id)
            .bind(like_pattern(&filter.services))
            .bind(like_pattern(&filter.room_equipment))
            .bind(filter.state)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookingDetail::from).collect())
    }

    pub async fn find_detail(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<BookingDetail>, AppError> {
        let sql = format!("{} WHERE b.tenant_id = $1 AND b.id = $2", detail_select());
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BookingDetail::from))
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM bookings b WHERE b.tenant_id = $1 AND b.id = $2",
            BOOKING_COLUMNS
        );
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(booking)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        professional_id: Uuid,
        target: BookingTarget,
        payload: &CreateBookingPayload,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO bookings (
                tenant_id, professional_id, customer_id, class_id, title, coupon, services,
                room_equipment, date, start_time, end_time, internal_notes, treatment_record_marking
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        );
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(tenant_id)
            .bind(professional_id)
            .bind(target.customer_id())
            .bind(target.class_id())
            .bind(payload.title.as_deref())
            .bind(payload.coupon.as_deref())
            .bind(payload.services.as_deref())
            .bind(payload.room_equipment.as_deref())
            .bind(payload.date)
            .bind(payload.start_time)
            .bind(payload.end_time)
            .bind(payload.internal_notes.as_deref())
            .bind(payload.treatment_record_marking)
            .fetch_one(executor)
            .await?;
        Ok(booking)
    }

    /// Grava a reserva já mesclada com a edição.
    pub async fn save(&self, booking: &Booking) -> Result<Booking, AppError> {
        let sql = format!(
            r#"
            UPDATE bookings SET
                professional_id = $3, customer_id = $4, class_id = $5, title = $6, coupon = $7,
                services = $8, room_equipment = $9, date = $10, start_time = $11, end_time = $12,
                internal_notes = $13, treatment_record_marking = $14, state = $15,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(booking.tenant_id)
            .bind(booking.id)
            .bind(booking.professional_id)
            .bind(booking.customer_id)
            .bind(booking.class_id)
            .bind(booking.title.as_deref())
            .bind(booking.coupon.as_deref())
            .bind(booking.services.as_deref())
            .bind(booking.room_equipment.as_deref())
            .bind(booking.date)
            .bind(booking.start_time)
            .bind(booking.end_time)
            .bind(booking.internal_notes.as_deref())
            .bind(booking.treatment_record_marking)
            .bind(booking.state)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Reservation"))
    }

    pub async fn set_state(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        state: BookingState,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET state = $3, updated_at = NOW() WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(state)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation"));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation"));
        }
        Ok(())
    }

    /// Intervalos ocupados do profissional numa data (sem horas completas são ignorados).
    pub async fn booked_ranges(
        &self,
        tenant_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<(NaiveTime, NaiveTime)>, AppError> {
        let ranges: Vec<(NaiveTime, NaiveTime)> = sqlx::query_as(
            r#"
            SELECT start_time, end_time FROM bookings
            WHERE tenant_id = $1 AND professional_id = $2 AND date = $3
              AND start_time IS NOT NULL AND end_time IS NOT NULL
            ORDER BY start_time
            "#,
        )
        .bind(tenant_id)
        .bind(professional_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(ranges)
    }

    /// Reservas confirmadas de uma data, em todos os tenants.
    pub async fn confirmed_on(&self, date: NaiveDate) -> Result<Vec<ReminderRow>, AppError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            r#"
            SELECT
                b.id AS booking_id, b.tenant_id, b.title, b.date, b.start_time, b.end_time,
                u.full_name AS professional_name, u.email AS professional_email,
                c.full_name AS customer_name, c.email AS customer_email
            FROM bookings b
            JOIN users u ON u.id = b.professional_id
            LEFT JOIN customers c ON c.id = b.customer_id
            WHERE b.date = $1 AND b.state = 'confirmed'
            ORDER BY b.start_time NULLS LAST
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
