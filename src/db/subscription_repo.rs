// src/db/subscription_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::subscription::{
        CreatePackPayload, Order, Pack, PaymentMethod, PaymentStatus, SubscriptionHistory,
        UpdatePackPayload,
    },
};

const PACK_COLUMNS: &str =
    "id, tenant_id, title, description, active, price, total_hours, created_at, updated_at";

const ORDER_COLUMNS: &str = r#"
    id, tenant_id, user_id, pack_id, order_number, order_id, amount, payment_method,
    payment_status, mb_key, mb_entity, mb_reference, expiry_date, mbway_phone,
    ccard_payment_url, ccard_signature_key, request_id, created_at, paid_at
"#;

fn to_money(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default().round_dp(2)
}

/// Campos devolvidos pelo gateway ao criar o pagamento.
#[derive(Debug, Default, Clone)]
pub struct GatewayFields {
    pub mb_key: Option<String>,
    pub mb_entity: Option<String>,
    pub mb_reference: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub mbway_phone: Option<String>,
    pub ccard_payment_url: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PACOTES
    // =========================================================================

    pub async fn list_packs(&self, tenant_id: Uuid, only_active: bool) -> Result<Vec<Pack>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM packs
            WHERE tenant_id = $1 AND (NOT $2 OR active)
            ORDER BY price
            "#,
            PACK_COLUMNS
        );
        let packs = sqlx::query_as::<_, Pack>(&sql)
            .bind(tenant_id)
            .bind(only_active)
            .fetch_all(&self.pool)
            .await?;
        Ok(packs)
    }

    pub async fn find_pack(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Pack>, AppError> {
        let sql = format!("SELECT {} FROM packs WHERE tenant_id = $1 AND id = $2", PACK_COLUMNS);
        let pack = sqlx::query_as::<_, Pack>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pack)
    }

    pub async fn create_pack(&self, tenant_id: Uuid, payload: &CreatePackPayload) -> Result<Pack, AppError> {
        let sql = format!(
            r#"
            INSERT INTO packs (tenant_id, title, description, active, price, total_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PACK_COLUMNS
        );
        let pack = sqlx::query_as::<_, Pack>(&sql)
            .bind(tenant_id)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(payload.active)
            .bind(to_money(payload.price))
            .bind(payload.total_hours)
            .fetch_one(&self.pool)
            .await?;
        Ok(pack)
    }

    pub async fn update_pack(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdatePackPayload,
    ) -> Result<Pack, AppError> {
        let sql = format!(
            r#"
            UPDATE packs SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                active = COALESCE($5, active),
                price = COALESCE($6, price),
                total_hours = COALESCE($7, total_hours),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            PACK_COLUMNS
        );
        sqlx::query_as::<_, Pack>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(payload.title.as_deref())
            .bind(payload.description.as_deref())
            .bind(payload.active)
            .bind(payload.price.map(to_money))
            .bind(payload.total_hours)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Pack"))
    }

    pub async fn delete_pack(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM packs WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pack"));
        }
        Ok(())
    }

    // =========================================================================
    //  ENCOMENDAS
    // =========================================================================

    pub async fn next_order_number(&self) -> Result<i64, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT nextval('order_number_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_order(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        pack_id: Uuid,
        order_number: i64,
        order_id: &str,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Order, AppError> {
        let sql = format!(
            r#"
            INSERT INTO orders (tenant_id, user_id, pack_id, order_number, order_id, amount, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(tenant_id)
            .bind(user_id)
            .bind(pack_id)
            .bind(order_number)
            .bind(order_id)
            .bind(amount)
            .bind(method)
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn store_gateway_fields(&self, id: Uuid, fields: &GatewayFields) -> Result<Order, AppError> {
        let sql = format!(
            r#"
            UPDATE orders SET
                mb_key = $2, mb_entity = $3, mb_reference = $4, expiry_date = $5,
                mbway_phone = $6, ccard_payment_url = $7, request_id = $8
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(fields.mb_key.as_deref())
            .bind(fields.mb_entity.as_deref())
            .bind(fields.mb_reference.as_deref())
            .bind(fields.expiry_date)
            .bind(fields.mbway_phone.as_deref())
            .bind(fields.ccard_payment_url.as_deref())
            .bind(fields.request_id.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Order"))
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Com `user_id`, só as encomendas desse utilizador.
    pub async fn list_orders(&self, tenant_id: Uuid, user_id: Option<Uuid>) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM orders
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            "#,
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn find_order(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Order>, AppError> {
        let sql = format!("SELECT {} FROM orders WHERE tenant_id = $1 AND id = $2", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    // Callbacks não têm tenant: a busca é global pelo identificador público.
    pub async fn find_by_public_id(&self, order_id: &str) -> Result<Option<Order>, AppError> {
        let sql = format!("SELECT {} FROM orders WHERE order_id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_by_mb_reference(&self, reference: &str) -> Result<Option<Order>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE mb_reference = $1 ORDER BY created_at DESC LIMIT 1",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Marca como pago apenas se ainda não estiver. Retorna false quando já estava.
    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        signature_key: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_status = 'Pago',
                paid_at = NOW(),
                ccard_signature_key = COALESCE($2, ccard_signature_key)
            WHERE id = $1 AND payment_status <> 'Pago'
            "#,
        )
        .bind(id)
        .bind(signature_key)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE orders SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_history<'e, E>(
        &self,
        executor: E,
        order: &Order,
        hours_added: i32,
    ) -> Result<SubscriptionHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, SubscriptionHistory>(
            r#"
            INSERT INTO subscription_history (tenant_id, user_id, pack_id, order_id, hours_added)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tenant_id, user_id, pack_id, order_id, hours_added, subscribed_at
            "#,
        )
        .bind(order.tenant_id)
        .bind(order.user_id)
        .bind(order.pack_id)
        .bind(order.id)
        .bind(hours_added)
        .fetch_one(executor)
        .await?;
        Ok(history)
    }

    pub async fn pack_hours<'e, E>(&self, executor: E, pack_id: Uuid) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hours: Option<i32> = sqlx::query_scalar("SELECT total_hours FROM packs WHERE id = $1")
            .bind(pack_id)
            .fetch_optional(executor)
            .await?;
        hours.ok_or(AppError::NotFound("Pack"))
    }
}
