// src/models/subscription.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// ---
// Pacotes de horas
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub price: Decimal,
    pub total_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pack 10 horas")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    #[schema(example = 250.0)]
    pub price: f64,
    #[validate(range(min = 0, message = "Total hours cannot be negative."))]
    #[schema(example = 10)]
    pub total_hours: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Total hours cannot be negative."))]
    pub total_hours: Option<i32>,
}

// ---
// Pagamentos
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Multibanco,
    Mbway,
    Creditcard,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "multibanco" => Some(Self::Multibanco),
            "mbway" => Some(Self::Mbway),
            "creditcard" => Some(Self::Creditcard),
            _ => None,
        }
    }

    /// Tamanho máximo do orderId aceite pelo gateway.
    pub fn max_order_id_len(&self) -> usize {
        match self {
            Self::Multibanco => 25,
            Self::Mbway | Self::Creditcard => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    Pendente,
    Pago,
    Cancelado,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub pack_id: Uuid,
    pub order_number: i64,
    pub order_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub mb_key: Option<String>,
    pub mb_entity: Option<String>,
    pub mb_reference: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub mbway_phone: Option<String>,
    pub ccard_payment_url: Option<String>,
    #[serde(skip_serializing)]
    pub ccard_signature_key: Option<String>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Pago
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionHistory {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub pack_id: Uuid,
    pub order_id: Option<Uuid>,
    pub hours_added: i32,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub pack_id: Uuid,
    /// multibanco (padrão), mbway ou creditcard
    pub payment_method: Option<String>,
    #[schema(example = "912345678")]
    pub phone_number: Option<String>,
}

// Resposta do subscribe: a encomenda e as instruções de pagamento
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub order: Order,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MbwayStatusResponse {
    pub order_id: String,
    pub status: String,
    pub message: String,
}

// Parâmetros do callback genérico (GET query ou POST form)
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentCallbackParams {
    pub id: Option<String>,
    pub order_id: Option<String>,
    pub referencia: Option<String>,
    pub reference: Option<String>,
    pub valor: Option<String>,
    pub amount: Option<String>,
    pub chave: Option<String>,
}

// Retorno do cartão de crédito
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreditCardCallbackParams {
    pub id: Option<String>,
    pub amount: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    pub sk: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_limits_order_id_length() {
        assert_eq!(PaymentMethod::Multibanco.max_order_id_len(), 25);
        assert_eq!(PaymentMethod::Mbway.max_order_id_len(), 15);
        assert_eq!(PaymentMethod::Creditcard.max_order_id_len(), 15);
    }

    #[test]
    fn unknown_payment_method_is_none() {
        assert_eq!(PaymentMethod::parse("mbway"), Some(PaymentMethod::Mbway));
        assert_eq!(PaymentMethod::parse("paypal"), None);
    }

    #[test]
    fn payment_status_serializes_with_portuguese_names() {
        let json = serde_json::to_string(&PaymentStatus::Pago).unwrap();
        assert_eq!(json, "\"Pago\"");
    }
}
