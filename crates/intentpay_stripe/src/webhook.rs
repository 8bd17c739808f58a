// --- File: crates/intentpay_stripe/src/webhook.rs ---
//! Stripe webhook signature verification and event dispatch.
//!
//! Dispatch only logs. No gateway call is made for any event, so a redelivered
//! event is harmless.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::StripeError;
use crate::models::PaymentIntent;

/// Header carrying `t=<unix>,v1=<hex>[,v1=<hex>...]`.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WebhookEventData {
    /// The object the event is about; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: WebhookEventData,
}

/// HMAC-SHA256 of `"{timestamp}.{payload}"`, hex encoded.
pub fn compute_signature(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a `Stripe-Signature` header against the raw request body.
pub fn verify_signature(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
) -> Result<(), StripeError> {
    verify_signature_at(payload, sig_header, secret, tolerance_secs, Utc::now().timestamp())
}

/// [`verify_signature`] with an explicit clock.
pub fn verify_signature_at(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;
    if secret.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Webhook secret is not configured".to_string(),
        ));
    }

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_str = Some(value),
                "v1" => v1_signatures_hex.push(value),
                _ => {} // v0 and unknown schemes are ignored
            }
        }
    }

    let timestamp = timestamp_str
        .ok_or_else(|| {
            StripeError::WebhookSignatureError(
                "Missing timestamp 't' in Stripe-Signature".to_string(),
            )
        })?
        .parse::<i64>()
        .map_err(|_| {
            StripeError::WebhookSignatureError(
                "Invalid timestamp format in Stripe-Signature".to_string(),
            )
        })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    let within_tolerance = now
        .checked_sub(timestamp)
        .map(i64::unsigned_abs)
        .is_some_and(|age| age <= tolerance_secs.unsigned_abs());
    if !within_tolerance {
        debug!(
            "Webhook timestamp outside tolerance. Now: {}, Event: {}",
            now, timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    let expected = compute_signature(payload, secret, timestamp)?;
    if v1_signatures_hex
        .iter()
        .any(|provided| constant_time_eq(expected.as_bytes(), provided.as_bytes()))
    {
        Ok(())
    } else {
        Err(StripeError::WebhookSignatureError(
            "Signature mismatch".to_string(),
        ))
    }
}

/// Helper for constant-time string comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Verifies the signature, then decodes the event envelope.
pub fn construct_event(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
) -> Result<WebhookEvent, StripeError> {
    verify_signature(payload, sig_header, secret, tolerance_secs)?;
    serde_json::from_slice(payload)
        .map_err(|e| StripeError::WebhookPayloadError(format!("Invalid event envelope: {}", e)))
}

// --- Dispatch ---

/// Event types with a dedicated handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    PaymentMethodAttached,
    PaymentIntentSucceeded,
    PaymentIntentPaymentFailed,
    PaymentIntentRequiresAction,
    PaymentIntentAmountCapturableUpdated,
}

type EventHandler = fn(&WebhookEvent) -> Result<WebhookOutcome, StripeError>;

impl WebhookEventKind {
    /// Exact match on the event `type` string.
    pub fn from_type(event_type: &str) -> Option<Self> {
        match event_type {
            "payment_method.attached" => Some(Self::PaymentMethodAttached),
            "payment_intent.succeeded" => Some(Self::PaymentIntentSucceeded),
            "payment_intent.payment_failed" => Some(Self::PaymentIntentPaymentFailed),
            "payment_intent.requires_action" => Some(Self::PaymentIntentRequiresAction),
            "payment_intent.amount_capturable_updated" => {
                Some(Self::PaymentIntentAmountCapturableUpdated)
            }
            _ => None,
        }
    }

    fn handler(self) -> EventHandler {
        match self {
            Self::PaymentMethodAttached => on_payment_method_attached,
            Self::PaymentIntentSucceeded => on_payment_intent_succeeded,
            Self::PaymentIntentPaymentFailed => on_payment_failed,
            Self::PaymentIntentRequiresAction => on_requires_action,
            Self::PaymentIntentAmountCapturableUpdated => on_amount_capturable_updated,
        }
    }
}

/// What dispatch did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Handled(WebhookEventKind),
    /// No handler for this type; acknowledged anyway.
    Acknowledged,
}

/// Routes a verified event to its handler.
pub fn dispatch(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    match WebhookEventKind::from_type(&event.event_type) {
        Some(kind) => kind.handler()(event),
        None => {
            info!(event_id = %event.id, event_type = %event.event_type, "Unhandled event type");
            Ok(WebhookOutcome::Acknowledged)
        }
    }
}

fn on_payment_method_attached(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    info!(event_id = %event.id, "A PaymentMethod has successfully been saved to a Customer");
    Ok(WebhookOutcome::Handled(WebhookEventKind::PaymentMethodAttached))
}

fn on_payment_intent_succeeded(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    let intent: PaymentIntent = serde_json::from_value(event.data.object.clone())
        .map_err(|e| StripeError::WebhookPayloadError(format!("Invalid payment intent: {}", e)))?;

    if intent.setup_future_usage.is_none() {
        info!(
            intent_id = %intent.id,
            "Customer did not want to save the card"
        );
    }
    info!(
        event_id = %event.id,
        intent_id = %intent.id,
        amount = intent.amount,
        "Payment received"
    );
    Ok(WebhookOutcome::Handled(WebhookEventKind::PaymentIntentSucceeded))
}

fn on_payment_failed(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    warn!(event_id = %event.id, "Payment failed");
    Ok(WebhookOutcome::Handled(WebhookEventKind::PaymentIntentPaymentFailed))
}

fn on_requires_action(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    info!(event_id = %event.id, "Payment requires customer action");
    Ok(WebhookOutcome::Handled(WebhookEventKind::PaymentIntentRequiresAction))
}

fn on_amount_capturable_updated(event: &WebhookEvent) -> Result<WebhookOutcome, StripeError> {
    info!(
        event_id = %event.id,
        object = %event.data.object,
        "Capturable amount updated"
    );
    Ok(WebhookOutcome::Handled(
        WebhookEventKind::PaymentIntentAmountCapturableUpdated,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn header(payload: &[u8], timestamp: i64) -> String {
        format!(
            "t={},v1={}",
            timestamp,
            compute_signature(payload, SECRET, timestamp).unwrap()
        )
    }

    fn event(event_type: &str, object: serde_json::Value) -> WebhookEvent {
        WebhookEvent {
            id: "evt_1".to_string(),
            event_type: event_type.to_string(),
            created: NOW,
            livemode: false,
            data: WebhookEventData { object },
        }
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let sig = header(payload, NOW);
        assert!(verify_signature_at(payload, Some(&sig), SECRET, 300, NOW + 10).is_ok());
    }

    #[test]
    fn test_any_matching_v1_entry_is_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let good = compute_signature(payload, SECRET, NOW).unwrap();
        let sig = format!("t={},v0=abc,v1={},v1={}", NOW, "00".repeat(32), good);
        assert!(verify_signature_at(payload, Some(&sig), SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_rejections() {
        let payload = br#"{"id":"evt_1"}"#;
        let good = header(payload, NOW);
        let cases: Vec<(Option<String>, i64)> = vec![
            (None, NOW),
            (Some("v1=deadbeef".to_string()), NOW),
            (Some(format!("t={}", NOW)), NOW),
            (Some("t=yesterday,v1=deadbeef".to_string()), NOW),
            (Some(good.clone()), NOW + 301),
            (Some(good.replace("v1=", "v1=0")), NOW),
            (Some(format!("t={},v1=00", i64::MIN)), NOW),
            (Some(format!("t={},v1=00", i64::MAX)), -NOW),
        ];
        for (sig, now) in cases {
            let result = verify_signature_at(payload, sig.as_deref(), SECRET, 300, now);
            assert!(
                matches!(result, Err(StripeError::WebhookSignatureError(_))),
                "expected rejection for {:?}",
                sig
            );
        }
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let sig = header(br#"{"amount":100}"#, NOW);
        let result = verify_signature_at(br#"{"amount":999}"#, Some(&sig), SECRET, 300, NOW);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let payload = b"{}";
        let sig = header(payload, NOW);
        assert!(verify_signature_at(payload, Some(&sig), "", 300, NOW).is_err());
    }

    #[test]
    fn test_dispatch_table_is_exact_match() {
        assert_eq!(
            WebhookEventKind::from_type("payment_method.attached"),
            Some(WebhookEventKind::PaymentMethodAttached)
        );
        assert_eq!(
            WebhookEventKind::from_type("payment_intent.amount_capturable_updated"),
            Some(WebhookEventKind::PaymentIntentAmountCapturableUpdated)
        );
        assert_eq!(WebhookEventKind::from_type("payment_intent.succeeded.v2"), None);
        assert_eq!(WebhookEventKind::from_type("PAYMENT_INTENT.SUCCEEDED"), None);
    }

    #[test]
    fn test_unknown_event_is_acknowledged() {
        let outcome = dispatch(&event("charge.refunded", json!({}))).unwrap();
        assert_eq!(outcome, WebhookOutcome::Acknowledged);
    }

    #[test]
    fn test_succeeded_event_decodes_intent() {
        let object = json!({
            "id": "pi_1",
            "amount": 1400,
            "currency": "usd",
            "status": "succeeded",
            "customer": null,
            "setup_future_usage": null,
            "client_secret": null,
            "description": null,
            "statement_descriptor": null,
            "statement_descriptor_suffix": null,
            "receipt_email": null,
            "application_fee_amount": null,
            "payment_method": null
        });
        let outcome = dispatch(&event("payment_intent.succeeded", object)).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Handled(WebhookEventKind::PaymentIntentSucceeded)
        );
    }

    #[test]
    fn test_succeeded_event_with_bad_object_is_payload_error() {
        let result = dispatch(&event("payment_intent.succeeded", json!({"id": 42})));
        assert!(matches!(result, Err(StripeError::WebhookPayloadError(_))));
    }

    #[test]
    fn test_construct_event_checks_signature_before_decoding() {
        let payload = b"not json";
        assert!(matches!(
            construct_event(payload, Some("t=1,v1=00"), SECRET, 300),
            Err(StripeError::WebhookSignatureError(_))
        ));

        let now = Utc::now().timestamp();
        let sig = header(payload, now);
        assert!(matches!(
            construct_event(payload, Some(&sig), SECRET, 300),
            Err(StripeError::WebhookPayloadError(_))
        ));
    }
}
