//! Endpoint tests driving the router with `tower::ServiceExt::oneshot`.


use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use fixtures::{create_mock_config, intent, Call, RecordingGateway, PUBLISHABLE_KEY, WEBHOOK_SECRET};
use intentpay_stripe::models::{CaptureMethod, IntentStatus, SetupFutureUsage};
use intentpay_stripe::routes;
use intentpay_stripe::webhook::{compute_signature, SIGNATURE_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(gateway: &RecordingGateway) -> Router {
    routes(create_mock_config(), Arc::new(gateway.clone()))
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn signed_webhook(payload: &str) -> Request<Body> {
    let timestamp = Utc::now().timestamp();
    let signature = compute_signature(payload.as_bytes(), WEBHOOK_SECRET, timestamp).unwrap();
    Request::builder()
        .method(Method::POST)
        .uri("/webhook")
        .header(SIGNATURE_HEADER, format!("t={},v1={}", timestamp, signature))
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_capture_passes_amount_and_returns_payload_unchanged() {
    let gateway = RecordingGateway::new().with_intent(intent(
        "pi_x",
        "cus_1",
        IntentStatus::RequiresCapture,
        500,
    ));

    let (status, body) = send(
        app(&gateway),
        post(
            "/capture-payment-intent",
            r#"{"paymentIntentID":"pi_x","amount":500}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    match gateway.calls().as_slice() {
        [Call::Capture(id, params)] => {
            assert_eq!(id, "pi_x");
            assert_eq!(params.amount_to_capture, Some(500));
        }
        other => panic!("expected a single capture, got {:?}", other),
    }

    let stored = gateway.intent("pi_x").unwrap();
    assert_eq!(json_body(&body), serde_json::to_value(&stored).unwrap());
    assert_eq!(json_body(&body)["amount_received"], json!(500));
}

#[tokio::test]
async fn test_capture_requires_positive_amount() {
    let gateway = RecordingGateway::new();
    let (status, _) = send(
        app(&gateway),
        post(
            "/capture-payment-intent",
            r#"{"paymentIntentID":"pi_x","amount":0}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_payment_intent_rejects_unparseable_body() {
    let gateway = RecordingGateway::new();
    let (status, body) = send(app(&gateway), post("/create-payment-intent", "{not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_payment_intent_empty_body_defaults_to_usd() {
    let gateway = RecordingGateway::new().with_next_id("pi_hold");
    let (status, body) = send(app(&gateway), post("/create-payment-intent", Body::empty())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({
            "publicKey": PUBLISHABLE_KEY,
            "clientSecret": "pi_hold_secret_test",
            "id": "pi_hold"
        })
    );

    match gateway.calls().as_slice() {
        [Call::Create(params)] => {
            assert_eq!(params.currency, "USD");
            assert_eq!(params.amount, 100);
            assert_eq!(params.customer.as_deref(), Some("cus_demo"));
            assert_eq!(params.capture_method, Some(CaptureMethod::Manual));
            assert_eq!(params.setup_future_usage, Some(SetupFutureUsage::OffSession));
            assert_eq!(params.statement_descriptor_suffix.as_deref(), Some("pre-auth"));
        }
        other => panic!("expected a single create, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_is_malformed_on_other_routes() {
    let gateway = RecordingGateway::new();
    let (status, _) = send(
        app(&gateway),
        post("/resolve-last-payment-intent", Body::empty()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let gateway = RecordingGateway::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/create-payment-intent")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&gateway), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(app(&gateway), post("/config", Body::empty())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_resolve_last_payment_intent_replaces_stale_intent() {
    let gateway = RecordingGateway::new()
        .with_intent(intent("pi_old", "cus_1", IntentStatus::RequiresPaymentMethod, 310))
        .with_next_id("pi_new");

    let (status, body) = send(
        app(&gateway),
        post("/resolve-last-payment-intent", r#"{"customerID":"cus_1"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({
            "amount": 310,
            "publicKey": PUBLISHABLE_KEY,
            "clientSecret": "pi_new_secret_test",
            "id": "pi_new"
        })
    );
}

#[tokio::test]
async fn test_resolve_unknown_customer_is_server_error() {
    let gateway = RecordingGateway::new();
    let (status, body) = send(
        app(&gateway),
        post("/resolve-last-payment-intent", r#"{"customerID":"cus_none"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("cus_none"));
}

#[tokio::test]
async fn test_missing_customer_id_is_bad_request() {
    let gateway = RecordingGateway::new();
    let (status, _) = send(app(&gateway), post("/resolve-last-payment-intent", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_uses_abandoned_reason() {
    let gateway = RecordingGateway::new().with_intent(intent(
        "pi_x",
        "cus_1",
        IntentStatus::RequiresCapture,
        500,
    ));
    let (status, body) = send(
        app(&gateway),
        post("/cancel-payment-intent", r#"{"paymentIntentID":"pi_x"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], json!("canceled"));
    assert!(matches!(
        gateway.calls().as_slice(),
        [Call::Cancel(id, _)] if id == "pi_x"
    ));
}

#[tokio::test]
async fn test_confirm_returns_client_secret_without_mutating() {
    let gateway = RecordingGateway::new().with_intent(intent(
        "pi_x",
        "cus_1",
        IntentStatus::RequiresConfirmation,
        500,
    ));
    let (status, body) = send(
        app(&gateway),
        post("/confirm-payment-intent", r#"{"paymentIntentID":"pi_x"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["clientSecret"], json!("pi_x_secret_test"));
    assert!(gateway.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_update_requires_a_change() {
    let gateway = RecordingGateway::new().with_intent(intent(
        "pi_x",
        "cus_1",
        IntentStatus::RequiresPaymentMethod,
        500,
    ));

    let (status, _) = send(
        app(&gateway),
        post("/update-payment-intent", r#"{"paymentIntentID":"pi_x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(&gateway),
        post(
            "/update-payment-intent",
            r#"{"paymentIntentID":"pi_x","amount":400,"paymentMethodID":"pm_saved"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["amount"], json!(400));
    assert_eq!(json_body(&body)["payment_method"], json!("pm_saved"));
}

#[tokio::test]
async fn test_charge_saved_payment_method() {
    let gateway = RecordingGateway::new().with_next_id("pi_charge");
    let (status, body) = send(
        app(&gateway),
        post(
            "/charge-saved-payment-method",
            r#"{"customerID":"cus_1","paymentMethodID":"pm_saved","amount":400,"currency":"usd"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({
            "id": "pi_charge",
            "status": "succeeded",
            "amount": 400,
            "publicKey": PUBLISHABLE_KEY,
            "clientSecret": "pi_charge_secret_test"
        })
    );
    match gateway.calls().as_slice() {
        [Call::Create(params)] => {
            assert_eq!(params.statement_descriptor.as_deref(), Some("firebolt"));
        }
        other => panic!("expected a single create, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_setup_intent() {
    let gateway = RecordingGateway::new();
    let (status, body) = send(
        app(&gateway),
        post("/create-setup-intent", r#"{"currency":"usd"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["id"], json!("seti_1"));
    assert!(matches!(
        gateway.calls().as_slice(),
        [Call::CreateSetup(params)] if params.customer.as_deref() == Some("cus_demo")
    ));
}

#[tokio::test]
async fn test_replayed_webhook_makes_no_gateway_calls() {
    let gateway = RecordingGateway::new();
    let payload = json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "created": 1700000000,
        "livemode": false,
        "data": { "object": {
            "id": "pi_1",
            "amount": 1400,
            "currency": "usd",
            "status": "succeeded",
            "customer": "cus_1",
            "setup_future_usage": null
        }}
    })
    .to_string();

    for _ in 0..2 {
        let (status, body) = send(app(&gateway), signed_webhook(&payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({ "status": "success" }));
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unhandled_webhook_type_is_acknowledged() {
    let gateway = RecordingGateway::new();
    let payload = r#"{"id":"evt_2","type":"customer.created","data":{"object":{}}}"#;
    let (status, body) = send(app(&gateway), signed_webhook(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "status": "success" }));
}

#[tokio::test]
async fn test_webhook_with_bad_signature_is_bad_request() {
    let gateway = RecordingGateway::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/webhook")
        .header(SIGNATURE_HEADER, "t=1700000000,v1=deadbeef")
        .body(Body::from(r#"{"id":"evt_1","type":"payment_intent.succeeded"}"#))
        .unwrap();

    let (status, _) = send(app(&gateway), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unsigned = post("/webhook", r#"{"id":"evt_1"}"#);
    let (status, _) = send(app(&gateway), unsigned).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_undecodable_intent_is_bad_request() {
    let gateway = RecordingGateway::new();
    let payload = r#"{"id":"evt_3","type":"payment_intent.succeeded","data":{"object":{"id":7}}}"#;
    let (status, _) = send(app(&gateway), signed_webhook(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_returns_publishable_key() {
    let gateway = RecordingGateway::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/config")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&gateway), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "publishableKey": PUBLISHABLE_KEY }));
}
