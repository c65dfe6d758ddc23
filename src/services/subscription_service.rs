// src/services/subscription_service.rs

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::Config,
    db::{subscription_repo::GatewayFields, SubscriptionRepository, TeamRepository, UserRepository},
    models::{
        auth::User,
        subscription::{
            CreatePackPayload, CreditCardCallbackParams, MbwayStatusResponse, Order, Pack,
            PaymentCallbackParams, PaymentMethod, PaymentStatus, SubscribePayload,
            SubscribeResponse, UpdatePackPayload,
        },
        tenancy::Membership,
    },
    services::{
        ifthenpay::{CreditCardRedirects, IfThenPayClient, MultibancoRequest},
        notification::{self, notify_quietly, Message, PaymentContext, SharedNotifier},
    },
};

/// Dias de validade da referência Multibanco.
const MULTIBANCO_EXPIRY_DAYS: u32 = 3;

/// "ORD-<yyyymmddHHMMSS>-<n>". Se não couber em `max_len`, usa
/// "ORD<n com zeros>" para não colidir ao cortar.
pub fn generate_order_id(order_number: i64, now: DateTime<Utc>, max_len: usize) -> String {
    let full = format!("ORD-{}-{}", now.format("%Y%m%d%H%M%S"), order_number);
    if full.len() <= max_len {
        return full;
    }

    let width = max_len.saturating_sub(3);
    let digits = format!("{:0width$}", order_number, width = width);
    // Mantém os dígitos menos significativos
    let start = digits.len().saturating_sub(width);
    format!("ORD{}", &digits[start..])
}

/// Telemóvel no formato do MB WAY: "351#912345678".
pub fn normalize_mbway_phone(phone: &str) -> Result<String, AppError> {
    let invalid = || {
        AppError::field(
            "phone_number",
            "Invalid phone number. Use the format 351#912345678.",
        )
    };

    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.trim_start_matches('+');

    if let Some((country, number)) = compact.split_once('#') {
        let valid = !country.is_empty()
            && !number.is_empty()
            && country.chars().all(|c| c.is_ascii_digit())
            && number.chars().all(|c| c.is_ascii_digit());
        return if valid {
            Ok(format!("{}#{}", country, number))
        } else {
            Err(invalid())
        };
    }

    if !compact.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    match compact.len() {
        9 => Ok(format!("351#{}", compact)),
        12 if compact.starts_with("351") => Ok(format!("351#{}", &compact[3..])),
        _ => Err(invalid()),
    }
}

/// Como o callback genérico identifica a encomenda: pelo id e,
/// se este faltar ou não for encontrado, pela referência Multibanco.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackLookup {
    pub order_id: Option<String>,
    pub reference: Option<String>,
}

impl CallbackLookup {
    pub fn from_params(params: &PaymentCallbackParams) -> Result<Self, AppError> {
        let non_empty = |v: &Option<String>| v.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from);

        let lookup = Self {
            order_id: non_empty(&params.id).or_else(|| non_empty(&params.order_id)),
            reference: non_empty(&params.referencia).or_else(|| non_empty(&params.reference)),
        };
        if lookup.order_id.is_none() && lookup.reference.is_none() {
            return Err(AppError::BadRequest("Missing parameters".to_string()));
        }
        Ok(lookup)
    }

    /// Procura pelo id; sem resultado, tenta a referência.
    pub async fn resolve<T, ById, ByRef, FutId, FutRef>(
        &self,
        by_id: ById,
        by_reference: ByRef,
    ) -> Result<Option<T>, AppError>
    where
        ById: FnOnce(String) -> FutId,
        ByRef: FnOnce(String) -> FutRef,
        FutId: Future<Output = Result<Option<T>, AppError>>,
        FutRef: Future<Output = Result<Option<T>, AppError>>,
    {
        if let Some(id) = &self.order_id {
            if let Some(found) = by_id(id.clone()).await? {
                return Ok(Some(found));
            }
        }
        match &self.reference {
            Some(reference) => by_reference(reference.clone()).await,
            None => Ok(None),
        }
    }
}

/// O que fazer com uma encomenda encontrada num callback de pagamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Já estava paga: responde OK sem tocar em nada.
    AlreadyPaid,
    Confirm,
}

impl CallbackOutcome {
    pub fn for_order(order: &Order) -> Self {
        if order.is_paid() {
            Self::AlreadyPaid
        } else {
            Self::Confirm
        }
    }
}

/// Página HTML devolvida ao utilizador depois do cartão.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPage {
    Confirmed { order_id: String, amount: Decimal },
    Failed,
    Cancelled,
}

impl PaymentPage {
    pub fn render(&self, frontend_url: &str) -> String {
        let (color, title, lines) = match self {
            Self::Confirmed { order_id, amount } => (
                "green",
                "✓ Pagamento Confirmado!",
                vec![
                    "O seu pagamento foi processado com sucesso.".to_string(),
                    format!("Pedido: {}", order_id),
                    format!("Valor: €{:.2}", amount.round_dp(2)),
                    "As suas horas foram adicionadas à sua conta.".to_string(),
                ],
            ),
            Self::Failed => (
                "red",
                "✗ Erro no Pagamento",
                vec![
                    "Ocorreu um erro ao processar o seu pagamento.".to_string(),
                    "Por favor, tente novamente.".to_string(),
                ],
            ),
            Self::Cancelled => (
                "orange",
                "⚠ Pagamento Cancelado",
                vec![
                    "O pagamento foi cancelado.".to_string(),
                    "Se mudou de ideias, pode tentar novamente.".to_string(),
                ],
            ),
        };

        let body: String = lines.iter().map(|l| format!("<p>{}</p>", l)).collect();
        format!(
            r#"<html><body style="font-family: Arial; text-align: center; padding: 50px;"><h1 style="color: {};">{}</h1>{}<p><a href="{}">Voltar ao início</a></p></body></html>"#,
            color, title, body, frontend_url
        )
    }
}

fn mbway_status_label(status: &crate::services::ifthenpay::MbwayStatus) -> &'static str {
    if status.is_paid() {
        "paid"
    } else if status.is_rejected() {
        "rejected"
    } else if status.is_expired() {
        "expired"
    } else {
        "pending"
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    repo: SubscriptionRepository,
    team_repo: TeamRepository,
    user_repo: UserRepository,
    gateway: IfThenPayClient,
    pool: PgPool,
    notifier: SharedNotifier,
    config: Arc<Config>,
}

impl SubscriptionService {
    pub fn new(
        repo: SubscriptionRepository,
        team_repo: TeamRepository,
        user_repo: UserRepository,
        gateway: IfThenPayClient,
        pool: PgPool,
        notifier: SharedNotifier,
        config: Arc<Config>,
    ) -> Self {
        Self {
            repo,
            team_repo,
            user_repo,
            gateway,
            pool,
            notifier,
            config,
        }
    }

    // =========================================================================
    //  PACOTES
    // =========================================================================

    /// Admin vê todos; restantes só os ativos.
    pub async fn list_packs(&self, tenant_id: Uuid, member: &Membership) -> Result<Vec<Pack>, AppError> {
        self.repo.list_packs(tenant_id, !member.is_admin()).await
    }

    pub async fn get_pack(&self, tenant_id: Uuid, member: &Membership, id: Uuid) -> Result<Pack, AppError> {
        self.repo
            .find_pack(tenant_id, id)
            .await?
            .filter(|pack| pack.active || member.is_admin())
            .ok_or(AppError::NotFound("Pack"))
    }

    pub async fn create_pack(&self, tenant_id: Uuid, payload: &CreatePackPayload) -> Result<Pack, AppError> {
        let pack = self.repo.create_pack(tenant_id, payload).await?;
        tracing::info!("📦 Pacote '{}' criado no tenant {}", pack.title, tenant_id);
        Ok(pack)
    }

    pub async fn update_pack(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdatePackPayload,
    ) -> Result<Pack, AppError> {
        self.repo.update_pack(tenant_id, id, payload).await
    }

    pub async fn delete_pack(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_pack(tenant_id, id).await
    }

    // =========================================================================
    //  SUBSCRIÇÃO
    // =========================================================================

    pub async fn subscribe(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        user: &User,
        payload: &SubscribePayload,
    ) -> Result<SubscribeResponse, AppError> {
        if !member.is_professional() {
            return Err(AppError::Forbidden(
                "Only professionals can subscribe to packs.".to_string(),
            ));
        }

        let method = match payload.payment_method.as_deref() {
            None => PaymentMethod::Multibanco,
            Some(value) => PaymentMethod::parse(value).ok_or_else(|| {
                AppError::BadRequest(
                    "Invalid payment method. Use multibanco, mbway or creditcard.".to_string(),
                )
            })?,
        };

        let pack = self
            .repo
            .find_pack(tenant_id, payload.pack_id)
            .await?
            .ok_or(AppError::NotFound("Pack"))?;
        if !pack.active {
            return Err(AppError::BadRequest("This pack is not available.".to_string()));
        }

        let phone = if method == PaymentMethod::Mbway {
            let raw = payload
                .phone_number
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| {
                    AppError::field(
                        "phone_number",
                        "Phone number is required for MB WAY payments. Format: 351#912345678",
                    )
                })?;
            Some(normalize_mbway_phone(raw)?)
        } else {
            None
        };

        let order_number = self.repo.next_order_number().await?;
        let order_id = generate_order_id(order_number, Utc::now(), method.max_order_id_len());
        let order = self
            .repo
            .create_order(tenant_id, user.id, pack.id, order_number, &order_id, pack.price, method)
            .await?;

        tracing::info!("🧾 Encomenda {} criada ({:?}) para {}", order.order_id, method, user.email);

        let (fields, message, summary) = match self
            .request_payment(&order, &pack, user, phone.as_deref())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("❌ Gateway falhou para {}: {:?}", order.order_id, e);
                self.repo.delete_order(order.id).await?;
                return Err(e);
            }
        };

        let order = self.repo.store_gateway_fields(order.id, &fields).await?;
        notify_quietly(self.notifier.as_ref(), message).await;

        Ok(SubscribeResponse {
            order,
            message: summary.to_string(),
        })
    }

    // Pede o pagamento ao gateway conforme o método da encomenda
    async fn request_payment(
        &self,
        order: &Order,
        pack: &Pack,
        user: &User,
        phone: Option<&str>,
    ) -> Result<(GatewayFields, Message, &'static str), AppError> {
        let ctx = PaymentContext {
            user_name: &user.full_name,
            pack_title: &pack.title,
            pack_hours: pack.total_hours,
            order_id: &order.order_id,
            amount: order.amount,
        };
        let description = format!("Subscription: {}", pack.title);

        match order.payment_method {
            PaymentMethod::Multibanco => {
                let client_phone = user
                    .contact_number
                    .as_deref()
                    .or(user.personal_mobile.as_deref())
                    .unwrap_or_default();
                let reference = self
                    .gateway
                    .create_multibanco_reference(&MultibancoRequest {
                        order_id: &order.order_id,
                        amount: order.amount,
                        client_email: &user.email,
                        client_name: &user.full_name,
                        client_phone,
                        description,
                        expiry_days: MULTIBANCO_EXPIRY_DAYS,
                    })
                    .await?;

                let message = notification::multibanco_instructions(
                    &user.email,
                    &ctx,
                    &reference.entity,
                    &reference.reference,
                    reference.expiry_date,
                );
                let fields = GatewayFields {
                    mb_key: self.config.ifthenpay.mb_key.clone(),
                    mb_entity: Some(reference.entity),
                    mb_reference: Some(reference.reference),
                    expiry_date: reference
                        .expiry_date
                        .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
                    request_id: reference.request_id,
                    ..Default::default()
                };
                Ok((
                    fields,
                    message,
                    "Order created successfully. Please complete the payment.",
                ))
            }
            PaymentMethod::Mbway => {
                let phone = phone.ok_or_else(|| {
                    AppError::field("phone_number", "Phone number is required for MB WAY payments.")
                })?;
                let payment = self
                    .gateway
                    .create_mbway_payment(&order.order_id, order.amount, phone, &user.email, &description)
                    .await?;

                let message = notification::mbway_instructions(&user.email, &ctx, phone);
                let fields = GatewayFields {
                    mbway_phone: Some(phone.to_string()),
                    request_id: payment.request_id,
                    ..Default::default()
                };
                Ok((
                    fields,
                    message,
                    "MB WAY payment request sent. Please approve on your phone within 4 minutes.",
                ))
            }
            PaymentMethod::Creditcard => {
                let base = format!(
                    "{}/api/subscriptions/callback/creditcard",
                    self.config.public_base_url.trim_end_matches('/')
                );
                let redirects = CreditCardRedirects {
                    success_url: format!("{}/success", base),
                    error_url: format!("{}/error", base),
                    cancel_url: format!("{}/cancel", base),
                    language: "pt".to_string(),
                };
                let payment = self
                    .gateway
                    .create_creditcard_payment(&order.order_id, order.amount, &redirects)
                    .await?;

                let message =
                    notification::creditcard_instructions(&user.email, &ctx, &payment.payment_url);
                let fields = GatewayFields {
                    ccard_payment_url: Some(payment.payment_url),
                    request_id: payment.request_id,
                    ..Default::default()
                };
                Ok((
                    fields,
                    message,
                    "Credit Card payment page ready. Redirect user to payment_url.",
                ))
            }
        }
    }

    // =========================================================================
    //  ENCOMENDAS
    // =========================================================================

    pub async fn list_orders(&self, tenant_id: Uuid, member: &Membership) -> Result<Vec<Order>, AppError> {
        let owner = (!member.is_admin()).then_some(member.user_id);
        self.repo.list_orders(tenant_id, owner).await
    }

    pub async fn get_order(&self, tenant_id: Uuid, member: &Membership, id: Uuid) -> Result<Order, AppError> {
        self.repo
            .find_order(tenant_id, id)
            .await?
            .filter(|order| member.is_admin() || order.user_id == member.user_id)
            .ok_or(AppError::NotFound("Order"))
    }

    pub async fn check_mbway_status(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
    ) -> Result<MbwayStatusResponse, AppError> {
        let order = self
            .repo
            .find_order(tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        if !member.is_admin() && order.user_id != member.user_id {
            return Err(AppError::Forbidden(
                "You do not have permission to view this order.".to_string(),
            ));
        }
        if order.payment_method != PaymentMethod::Mbway {
            return Err(AppError::BadRequest("This order is not an MB WAY payment.".to_string()));
        }
        if order.is_paid() {
            return Ok(MbwayStatusResponse {
                order_id: order.order_id,
                status: "paid".to_string(),
                message: "Payment already confirmed.".to_string(),
            });
        }

        let request_id = order
            .request_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("No MB WAY request id for this order.".to_string()))?;

        let status = self.gateway.check_mbway_status(request_id).await?;
        Ok(MbwayStatusResponse {
            order_id: order.order_id.clone(),
            status: mbway_status_label(&status).to_string(),
            message: status.message.unwrap_or_else(|| status.code.clone()),
        })
    }

    // =========================================================================
    //  CALLBACKS (públicos, sem tenant)
    // =========================================================================

    pub async fn handle_callback(&self, params: &PaymentCallbackParams) -> Result<(), AppError> {
        if !self.gateway.verify_callback(params) {
            return Err(AppError::Forbidden("Invalid callback".to_string()));
        }

        let lookup = CallbackLookup::from_params(params)?;
        let order = lookup
            .resolve(
                |id| async move { self.repo.find_by_public_id(&id).await },
                |reference| async move { self.repo.find_by_mb_reference(&reference).await },
            )
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        match CallbackOutcome::for_order(&order) {
            CallbackOutcome::AlreadyPaid => {
                tracing::info!("ℹ️ Encomenda {} já estava paga", order.order_id);
            }
            CallbackOutcome::Confirm => {
                self.confirm_payment(&order, None).await?;
            }
        }
        Ok(())
    }

    /// Retorno de sucesso do cartão: valida a assinatura e confirma.
    pub async fn creditcard_success(&self, params: &CreditCardCallbackParams) -> Result<Order, AppError> {
        let (Some(id), Some(amount), Some(request_id), Some(sk)) = (
            params.id.as_deref(),
            params.amount.as_deref(),
            params.request_id.as_deref(),
            params.sk.as_deref(),
        ) else {
            return Err(AppError::BadRequest("Missing parameters".to_string()));
        };

        let order = self
            .repo
            .find_by_public_id(id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        if !self
            .gateway
            .verify_creditcard_signature(id, amount, request_id, sk)
        {
            tracing::warn!("⚠️ Assinatura inválida no retorno do cartão para {}", id);
            return Err(AppError::Forbidden("Invalid signature".to_string()));
        }

        if CallbackOutcome::for_order(&order) == CallbackOutcome::Confirm {
            self.confirm_payment(&order, Some(sk)).await?;
        }
        Ok(order)
    }

    /// Erro ou cancelamento no cartão. Encomendas pagas não mudam.
    pub async fn creditcard_cancelled(&self, order_id: Option<&str>) -> Result<(), AppError> {
        let Some(order_id) = order_id else {
            return Ok(());
        };
        if let Some(order) = self.repo.find_by_public_id(order_id).await? {
            if !order.is_paid() {
                self.repo.set_status(order.id, PaymentStatus::Cancelado).await?;
                tracing::info!("🚫 Encomenda {} cancelada", order.order_id);
            }
        }
        Ok(())
    }

    pub fn frontend_url(&self) -> &str {
        &self.config.frontend_url
    }

    /// Marca como paga, credita as horas e regista o histórico numa transação.
    /// Retorna false se outra chamada já a tinha confirmado.
    async fn confirm_payment(&self, order: &Order, signature_key: Option<&str>) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.repo.mark_paid(&mut *tx, order.id, signature_key).await? {
            return Ok(false);
        }
        let hours = self.repo.pack_hours(&mut *tx, order.pack_id).await?;
        self.team_repo
            .add_hours(&mut *tx, order.tenant_id, order.user_id, hours)
            .await?;
        self.repo.add_history(&mut *tx, order, hours).await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Pagamento confirmado: {} (+{}h para {})",
            order.order_id,
            hours,
            order.user_id
        );

        self.notify_confirmed(order, hours).await;
        Ok(true)
    }

    async fn notify_confirmed(&self, order: &Order, hours: i32) {
        let lookup = async {
            let user = self.user_repo.find_by_id(order.user_id).await?;
            let pack = self.repo.find_pack(order.tenant_id, order.pack_id).await?;
            let member = self
                .team_repo
                .find_member(&self.pool, order.tenant_id, order.user_id)
                .await?;
            Ok::<_, AppError>((user, pack, member))
        };

        match lookup.await {
            Ok((Some(user), Some(pack), member)) => {
                let ctx = PaymentContext {
                    user_name: &user.full_name,
                    pack_title: &pack.title,
                    pack_hours: hours,
                    order_id: &order.order_id,
                    amount: order.amount,
                };
                let remaining = member.map(|m| m.remaining_hours).unwrap_or_default();
                let message = notification::payment_confirmed(&user.email, &ctx, remaining);
                notify_quietly(self.notifier.as_ref(), message).await;
            }
            Ok(_) => tracing::warn!("⚠️ Sem dados para notificar a encomenda {}", order.order_id),
            Err(e) => tracing::error!("❌ Falha ao preparar notificação de {}: {:?}", order.order_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 14, 30, 5).unwrap()
    }

    #[test]
    fn order_id_keeps_timestamp_when_it_fits() {
        assert_eq!(generate_order_id(42, now(), 25), "ORD-20250610143005-42");
    }

    #[test]
    fn short_order_id_falls_back_to_padded_number() {
        let id = generate_order_id(42, now(), 15);
        assert_eq!(id, "ORD000000000042");
        assert_eq!(id.len(), 15);
    }

    #[test]
    fn consecutive_short_order_ids_differ() {
        assert_ne!(generate_order_id(1, now(), 15), generate_order_id(2, now(), 15));
    }

    #[test]
    fn phone_numbers_are_normalized() {
        assert_eq!(normalize_mbway_phone("912345678").unwrap(), "351#912345678");
        assert_eq!(normalize_mbway_phone("+351 912 345 678").unwrap(), "351#912345678");
        assert_eq!(normalize_mbway_phone("351#912345678").unwrap(), "351#912345678");
    }

    #[test]
    fn bad_phone_numbers_are_rejected() {
        assert!(normalize_mbway_phone("12345").is_err());
        assert!(normalize_mbway_phone("351#abc").is_err());
        assert!(normalize_mbway_phone("#912345678").is_err());
    }

    fn order(status: PaymentStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            pack_id: Uuid::new_v4(),
            order_number: 1,
            order_id: "ORD-20250610143005-1".into(),
            amount: Decimal::new(4500, 2),
            payment_method: PaymentMethod::Multibanco,
            payment_status: status,
            mb_key: None,
            mb_entity: Some("12345".into()),
            mb_reference: Some("123456789".into()),
            expiry_date: None,
            mbway_phone: None,
            ccard_payment_url: None,
            ccard_signature_key: None,
            request_id: None,
            created_at: now(),
            paid_at: None,
        }
    }

    #[test]
    fn callback_keeps_both_identifiers() {
        let params = PaymentCallbackParams {
            order_id: Some("ORD-1".into()),
            reference: Some("123456789".into()),
            ..Default::default()
        };
        assert_eq!(
            CallbackLookup::from_params(&params).unwrap(),
            CallbackLookup {
                order_id: Some("ORD-1".into()),
                reference: Some("123456789".into()),
            }
        );
    }

    #[test]
    fn callback_accepts_reference_alone() {
        let params = PaymentCallbackParams {
            referencia: Some("123456789".into()),
            ..Default::default()
        };
        let lookup = CallbackLookup::from_params(&params).unwrap();
        assert_eq!(lookup.order_id, None);
        assert_eq!(lookup.reference.as_deref(), Some("123456789"));
    }

    #[tokio::test]
    async fn unknown_order_id_falls_back_to_reference() {
        let lookup = CallbackLookup {
            order_id: Some("UNKNOWN-ID".into()),
            reference: Some("123456789".into()),
        };
        let found = lookup
            .resolve(
                |_id| async { Ok::<Option<&str>, AppError>(None) },
                |reference| async move {
                    assert_eq!(reference, "123456789");
                    Ok(Some("por referência"))
                },
            )
            .await
            .unwrap();
        assert_eq!(found, Some("por referência"));
    }

    #[tokio::test]
    async fn known_order_id_skips_reference_lookup() {
        let lookup = CallbackLookup {
            order_id: Some("ORD-1".into()),
            reference: Some("123456789".into()),
        };
        let found = lookup
            .resolve(
                |id| async move { Ok::<_, AppError>(Some(id)) },
                |reference| async move { Ok(Some(reference)) },
            )
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("ORD-1"));
    }

    #[tokio::test]
    async fn nothing_found_by_either_key_is_none() {
        let lookup = CallbackLookup {
            order_id: None,
            reference: Some("000".into()),
        };
        let found = lookup
            .resolve(
                |_id| async { Ok::<_, AppError>(Some(99u8)) },
                |_reference| async { Ok(None) },
            )
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn redelivered_callback_for_paid_order_is_a_no_op() {
        assert_eq!(
            CallbackOutcome::for_order(&order(PaymentStatus::Pago)),
            CallbackOutcome::AlreadyPaid
        );
        assert_eq!(
            CallbackOutcome::for_order(&order(PaymentStatus::Pendente)),
            CallbackOutcome::Confirm
        );
        assert_eq!(
            CallbackOutcome::for_order(&order(PaymentStatus::Cancelado)),
            CallbackOutcome::Confirm
        );
    }

    #[test]
    fn callback_without_identifiers_is_bad_request() {
        let params = PaymentCallbackParams {
            id: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            CallbackLookup::from_params(&params),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn confirmation_page_shows_order_and_amount() {
        let html = PaymentPage::Confirmed {
            order_id: "ORD-7".into(),
            amount: Decimal::new(2500, 2),
        }
        .render("https://app.studio.pt");

        assert!(html.contains("✓ Pagamento Confirmado!"));
        assert!(html.contains("Pedido: ORD-7"));
        assert!(html.contains("Valor: €25.00"));
        assert!(html.contains(r#"href="https://app.studio.pt""#));
    }

    #[test]
    fn cancel_and_error_pages_differ() {
        assert!(PaymentPage::Cancelled.render("/").contains("⚠ Pagamento Cancelado"));
        assert!(PaymentPage::Failed.render("/").contains("✗ Erro no Pagamento"));
    }
}
