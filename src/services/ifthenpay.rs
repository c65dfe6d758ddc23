// src/services/ifthenpay.rs

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::{common::error::AppError, config::IfThenPayConfig};

// Códigos de estado do MB WAY
const MBWAY_OK: &str = "000";
const MBWAY_REJECTED: [&str; 2] = ["020", "122"];
const MBWAY_EXPIRED: &str = "101";

/// Valor com exatamente duas casas decimais, como o gateway exige.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Aceita DD-MM-YYYY (formato do gateway) ou YYYY-MM-DD.
pub fn parse_expiry_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| tracing::warn!("⚠️ Data de expiração inválida: {}", value))
        .ok()
}

pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

// O gateway devolve ora strings, ora números.
fn text(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn gateway_message(data: &Value, fallback: &str) -> String {
    text(data, "Message").unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug, Clone)]
pub struct MultibancoRequest<'a> {
    pub order_id: &'a str,
    pub amount: Decimal,
    pub client_email: &'a str,
    pub client_name: &'a str,
    pub client_phone: &'a str,
    pub description: String,
    pub expiry_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultibancoReference {
    pub entity: String,
    pub reference: String,
    pub request_id: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MbwayPayment {
    pub request_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MbwayStatus {
    pub code: String,
    pub message: Option<String>,
}

impl MbwayStatus {
    pub fn is_paid(&self) -> bool {
        self.code == MBWAY_OK
    }

    pub fn is_rejected(&self) -> bool {
        MBWAY_REJECTED.contains(&self.code.as_str())
    }

    pub fn is_expired(&self) -> bool {
        self.code == MBWAY_EXPIRED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreditCardPayment {
    pub payment_url: String,
    pub request_id: Option<String>,
}

pub struct CreditCardRedirects {
    pub success_url: String,
    pub error_url: String,
    pub cancel_url: String,
    pub language: String,
}

/// Cliente HTTP do gateway IfThenPay (Multibanco, MB WAY, cartão).
#[derive(Clone)]
pub struct IfThenPayClient {
    http: reqwest::Client,
    config: IfThenPayConfig,
}

impl IfThenPayClient {
    pub fn new(config: IfThenPayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn require_key<'a>(key: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
        key.as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::PaymentGateway(format!("{} key not configured", name)))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, AppError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::PaymentGateway(format!("Network error: {}", e)))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Invalid gateway response: {}", e)))
    }

    pub async fn create_multibanco_reference(
        &self,
        request: &MultibancoRequest<'_>,
    ) -> Result<MultibancoReference, AppError> {
        let mb_key = Self::require_key(&self.config.mb_key, "MultiBanco")?;
        let path = if self.config.sandbox {
            "/multibanco/reference/sandbox"
        } else {
            "/multibanco/reference/init"
        };

        let body = json!({
            "mbKey": mb_key,
            "amount": format_amount(request.amount),
            "orderId": request.order_id,
            "clientEmail": request.client_email,
            "clientName": request.client_name,
            "clientPhone": request.client_phone,
            "description": request.description,
            "expiryDays": request.expiry_days,
        });

        tracing::info!("🏧 Pedindo referência Multibanco para {}", request.order_id);
        let data = self.post_json(&self.url(path), &body).await?;

        if text(&data, "Status").as_deref() != Some("0") {
            let message = gateway_message(&data, "Unknown error");
            tracing::error!("❌ IfThenPay recusou {}: {}", request.order_id, message);
            return Err(AppError::PaymentGateway(message));
        }

        Ok(MultibancoReference {
            entity: text(&data, "Entity").unwrap_or_default(),
            reference: text(&data, "Reference").unwrap_or_default(),
            request_id: text(&data, "RequestId"),
            expiry_date: text(&data, "ExpiryDate").and_then(|d| parse_expiry_date(&d)),
        })
    }

    /// `mobile_number` no formato do gateway: "351#912345678".
    pub async fn create_mbway_payment(
        &self,
        order_id: &str,
        amount: Decimal,
        mobile_number: &str,
        email: &str,
        description: &str,
    ) -> Result<MbwayPayment, AppError> {
        let mbway_key = Self::require_key(&self.config.mbway_key, "MB WAY")?;
        let body = json!({
            "mbWayKey": mbway_key,
            "orderId": order_id.chars().take(15).collect::<String>(),
            "amount": format_amount(amount),
            "mobileNumber": mobile_number,
            "email": email,
            "description": description.chars().take(100).collect::<String>(),
        });

        tracing::info!("📱 Pedindo pagamento MB WAY para {}", order_id);
        let data = self.post_json(&self.url("/spg/payment/mbway"), &body).await?;

        if text(&data, "Status").as_deref() != Some(MBWAY_OK) {
            let message = gateway_message(&data, "Payment request failed");
            tracing::error!("❌ MB WAY recusado para {}: {}", order_id, message);
            return Err(AppError::PaymentGateway(message));
        }

        Ok(MbwayPayment {
            request_id: text(&data, "RequestId"),
            message: text(&data, "Message"),
        })
    }

    pub async fn check_mbway_status(&self, request_id: &str) -> Result<MbwayStatus, AppError> {
        let mbway_key = Self::require_key(&self.config.mbway_key, "MB WAY")?;

        let data = self
            .http
            .get(self.url("/spg/payment/mbway/status"))
            .query(&[("mbWayKey", mbway_key), ("requestId", request_id)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::PaymentGateway(format!("Network error: {}", e)))?
            .json::<Value>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Invalid gateway response: {}", e)))?;

        tracing::debug!("MB WAY status {}: {}", request_id, data);

        Ok(MbwayStatus {
            code: text(&data, "Status").unwrap_or_default(),
            message: text(&data, "Message"),
        })
    }

    pub async fn create_creditcard_payment(
        &self,
        order_id: &str,
        amount: Decimal,
        redirects: &CreditCardRedirects,
    ) -> Result<CreditCardPayment, AppError> {
        let ccard_key = Self::require_key(&self.config.ccard_key, "Credit Card")?;
        let path = if self.config.sandbox {
            format!("/creditcard/sandbox/init/{}", ccard_key)
        } else {
            format!("/creditcard/init/{}", ccard_key)
        };

        let body = json!({
            "orderId": order_id.chars().take(15).collect::<String>(),
            "amount": format_amount(amount),
            "successUrl": redirects.success_url,
            "errorUrl": redirects.error_url,
            "cancelUrl": redirects.cancel_url,
            "language": redirects.language,
        });

        tracing::info!("💳 Pedindo pagamento por cartão para {}", order_id);
        let data = self.post_json(&self.url(&path), &body).await?;

        if text(&data, "Status").as_deref() != Some("0") {
            let message = gateway_message(&data, "Payment request failed");
            tracing::error!("❌ Cartão recusado para {}: {}", order_id, message);
            return Err(AppError::PaymentGateway(message));
        }

        let payment_url = text(&data, "PaymentUrl")
            .ok_or_else(|| AppError::PaymentGateway("Missing PaymentUrl".to_string()))?;

        Ok(CreditCardPayment {
            payment_url,
            request_id: text(&data, "RequestId"),
        })
    }

    /// sk == sha256(orderId + amount + requestId + chave do cartão)
    pub fn verify_creditcard_signature(
        &self,
        order_id: &str,
        amount: &str,
        request_id: &str,
        signature: &str,
    ) -> bool {
        let Some(ccard_key) = self.config.ccard_key.as_deref() else {
            tracing::error!("❌ Chave do cartão não configurada para verificar assinatura");
            return false;
        };
        let expected = sha256_hex(&format!("{}{}{}{}", order_id, amount, request_id, ccard_key));
        expected.eq_ignore_ascii_case(signature)
    }

    // TODO: validar a "chave anti-phishing" do callback Multibanco quando o backoffice a configurar.
    pub fn verify_callback(&self, _params: &crate::models::subscription::PaymentCallbackParams) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(ccard_key: Option<&str>) -> IfThenPayClient {
        IfThenPayClient::new(IfThenPayConfig {
            mb_key: None,
            mbway_key: None,
            ccard_key: ccard_key.map(String::from),
            sandbox: true,
            base_url: "http://localhost".into(),
        })
        .unwrap()
    }

    #[test]
    fn amounts_have_two_decimals() {
        assert_eq!(format_amount(Decimal::new(25, 0)), "25.00");
        assert_eq!(format_amount(Decimal::new(19999, 3)), "20.00");
        assert_eq!(format_amount(Decimal::new(105, 1)), "10.50");
    }

    #[test]
    fn expiry_date_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 30);
        assert_eq!(parse_expiry_date("30-06-2025"), expected);
        assert_eq!(parse_expiry_date("2025-06-30"), expected);
        assert_eq!(parse_expiry_date("null"), None);
        assert_eq!(parse_expiry_date("30/06/2025"), None);
    }

    #[test]
    fn creditcard_signature_matches_sha256_of_fields() {
        let c = client(Some("KEY-123"));
        let sk = sha256_hex("ORD110.00REQ9KEY-123");

        assert!(c.verify_creditcard_signature("ORD1", "10.00", "REQ9", &sk));
        assert!(!c.verify_creditcard_signature("ORD1", "11.00", "REQ9", &sk));
    }

    #[test]
    fn signature_fails_without_key() {
        let c = client(None);
        assert!(!c.verify_creditcard_signature("ORD1", "10.00", "REQ9", "abc"));
    }

    #[test]
    fn mbway_status_codes() {
        let status = |code: &str| MbwayStatus {
            code: code.into(),
            message: None,
        };
        assert!(status("000").is_paid());
        assert!(status("020").is_rejected());
        assert!(status("122").is_rejected());
        assert!(status("101").is_expired());
        assert!(!status("123").is_paid());
    }

    #[test]
    fn gateway_numbers_are_read_as_text() {
        let data = json!({"Status": 0, "Entity": "12345"});
        assert_eq!(text(&data, "Status").as_deref(), Some("0"));
        assert_eq!(text(&data, "Entity").as_deref(), Some("12345"));
        assert_eq!(text(&data, "Missing"), None);
    }
}
