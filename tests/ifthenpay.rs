// tests/ifthenpay.rs
//
// Cliente IfThenPay contra um servidor HTTP falso.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use studio_backend::{
    common::error::AppError,
    config::IfThenPayConfig,
    services::ifthenpay::{CreditCardRedirects, IfThenPayClient, MultibancoRequest},
};

fn client(server: &MockServer, sandbox: bool) -> IfThenPayClient {
    IfThenPayClient::new(IfThenPayConfig {
        mb_key: Some("MB-KEY".into()),
        mbway_key: Some("MBWAY-KEY".into()),
        ccard_key: Some("CC-KEY".into()),
        sandbox,
        base_url: server.uri(),
    })
    .unwrap()
}

fn multibanco_request() -> MultibancoRequest<'static> {
    MultibancoRequest {
        order_id: "ORD-20250601120000-7",
        amount: Decimal::new(4500, 2),
        client_email: "ana@example.com",
        client_name: "Ana",
        client_phone: "912345678",
        description: "Pack 10h".into(),
        expiry_days: 3,
    }
}

#[tokio::test]
async fn multibanco_reference_is_parsed_from_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multibanco/reference/sandbox"))
        .and(body_partial_json(json!({ "mbKey": "MB-KEY", "amount": "45.00", "expiryDays": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "0",
            "Entity": "12345",
            "Reference": "987654321",
            "RequestId": "req-1",
            "ExpiryDate": "04-06-2025"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reference = client(&server, true)
        .create_multibanco_reference(&multibanco_request())
        .await
        .unwrap();

    assert_eq!(reference.entity, "12345");
    assert_eq!(reference.reference, "987654321");
    assert_eq!(reference.request_id.as_deref(), Some("req-1"));
    assert_eq!(reference.expiry_date, chrono::NaiveDate::from_ymd_opt(2025, 6, 4));
}

#[tokio::test]
async fn multibanco_refusal_becomes_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multibanco/reference/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "-1",
            "Message": "Invalid mbKey"
        })))
        .mount(&server)
        .await;

    let err = client(&server, false)
        .create_multibanco_reference(&multibanco_request())
        .await
        .unwrap_err();

    match err {
        AppError::PaymentGateway(message) => assert_eq!(message, "Invalid mbKey"),
        other => panic!("erro inesperado: {:?}", other),
    }
}

#[tokio::test]
async fn gateway_http_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spg/payment/mbway"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server, true)
        .create_mbway_payment("ORD1", Decimal::new(10, 0), "351#912345678", "a@b.pt", "Pack")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PaymentGateway(_)));
}

#[tokio::test]
async fn mbway_payment_and_status_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spg/payment/mbway"))
        .and(body_partial_json(json!({ "mbWayKey": "MBWAY-KEY", "mobileNumber": "351#912345678" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "000",
            "RequestId": "mbw-9",
            "Message": "Pedido enviado"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spg/payment/mbway/status"))
        .and(query_param("requestId", "mbw-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "122",
            "Message": "Recusado pelo utilizador"
        })))
        .mount(&server)
        .await;

    let gateway = client(&server, true);
    let payment = gateway
        .create_mbway_payment("ORD-20250601120000-7", Decimal::new(20, 0), "351#912345678", "a@b.pt", "Pack")
        .await
        .unwrap();
    assert_eq!(payment.request_id.as_deref(), Some("mbw-9"));

    let status = gateway.check_mbway_status("mbw-9").await.unwrap();
    assert!(status.is_rejected());
    assert!(!status.is_paid());
    assert_eq!(status.message.as_deref(), Some("Recusado pelo utilizador"));
}

#[tokio::test]
async fn creditcard_payment_returns_redirect_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/creditcard/sandbox/init/CC-KEY"))
        .and(body_partial_json(json!({ "amount": "30.00", "language": "pt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "0",
            "PaymentUrl": "https://pay.example/abc",
            "RequestId": "cc-1"
        })))
        .mount(&server)
        .await;

    let redirects = CreditCardRedirects {
        success_url: "http://api/success".into(),
        error_url: "http://api/error".into(),
        cancel_url: "http://api/cancel".into(),
        language: "pt".into(),
    };
    let payment = client(&server, true)
        .create_creditcard_payment("ORD1", Decimal::new(30, 0), &redirects)
        .await
        .unwrap();

    assert_eq!(payment.payment_url, "https://pay.example/abc");
    assert_eq!(payment.request_id.as_deref(), Some("cc-1"));
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    let gateway = IfThenPayClient::new(IfThenPayConfig {
        mb_key: None,
        mbway_key: None,
        ccard_key: None,
        sandbox: true,
        base_url: server.uri(),
    })
    .unwrap();

    let err = gateway.check_mbway_status("x").await.unwrap_err();
    assert!(matches!(err, AppError::PaymentGateway(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
