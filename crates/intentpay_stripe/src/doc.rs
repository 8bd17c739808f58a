// --- File: crates/intentpay_stripe/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    CaptureIntentRequest, ChargeResponse, ChargeSavedMethodRequest, ClientSecretResponse,
    ConfigResponse, CurrencyRequest, IntentIdRequest, ResolveIntentRequest,
    ResolvedIntentResponse, UpdateIntentRequest, WebhookAck,
};
use crate::models::{CaptureMethod, IntentStatus, SetupFutureUsage};
use crate::webhook::{WebhookEvent, WebhookEventData};

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body(content = CurrencyRequest, example = json!({ "currency": "USD" })),
    responses(
        (status = 200, description = "Pre-authorization intent created", body = ClientSecretResponse),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_create_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/resolve-last-payment-intent",
    request_body(content = ResolveIntentRequest, example = json!({ "customerID": "cus_R88nCQ6UTjjC2u" })),
    responses(
        (status = 200, description = "Customer's active payment intent, recreated if it was awaiting a payment method", body = ResolvedIntentResponse),
        (status = 400, description = "customerID missing"),
        (status = 500, description = "No payment intent for the customer, malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_resolve_last_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/create-setup-intent",
    request_body = CurrencyRequest,
    responses(
        (status = 200, description = "Setup intent created", body = ClientSecretResponse),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_create_setup_intent_handler() {}

#[utoipa::path(
    post,
    path = "/capture-payment-intent",
    request_body(content = CaptureIntentRequest, example = json!({ "paymentIntentID": "pi_x", "amount": 500 })),
    responses(
        (status = 200, description = "Captured payment intent exactly as Stripe returned it", body = Object),
        (status = 400, description = "paymentIntentID missing or amount not positive"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_capture_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/cancel-payment-intent",
    request_body = IntentIdRequest,
    responses(
        (status = 200, description = "Cancelled payment intent", body = Object),
        (status = 400, description = "paymentIntentID missing"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_cancel_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/confirm-payment-intent",
    request_body = IntentIdRequest,
    responses(
        (status = 200, description = "Client secret for client-side confirmation", body = ClientSecretResponse),
        (status = 400, description = "paymentIntentID missing"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_confirm_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/update-payment-intent",
    request_body(content = UpdateIntentRequest, example = json!({
        "paymentIntentID": "pi_3QA7SMAJlbf9cOtY0lJlpoyQ",
        "amount": 400,
        "paymentMethodID": "pm_1QAqIeAJlbf9cOtYXOevXdye",
        "description": "Invoice #4137591",
        "statementDescriptorSuffix": "invoice due"
    })),
    responses(
        (status = 200, description = "Updated payment intent", body = Object),
        (status = 400, description = "Nothing to update or invalid amount"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_update_payment_intent_handler() {}

#[utoipa::path(
    post,
    path = "/charge-saved-payment-method",
    request_body(content = ChargeSavedMethodRequest, example = json!({
        "customerID": "cus_R88nCQ6UTjjC2u",
        "paymentMethodID": "pm_1QAqIeAJlbf9cOtYXOevXdye",
        "amount": 400,
        "currency": "usd",
        "description": "Invoice #4137591"
    })),
    responses(
        (status = 200, description = "Charge submitted; requires_action means the client must authenticate", body = ChargeResponse),
        (status = 400, description = "Missing ids or amount not positive"),
        (status = 500, description = "Malformed body or Stripe API error")
    ),
    tag = "Payment Intents"
)]
fn doc_charge_saved_payment_method_handler() {}

#[utoipa::path(
    post,
    path = "/webhook",
    request_body = WebhookEvent,
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex>")),
    responses(
        (status = 200, description = "Webhook verified and acknowledged", body = WebhookAck),
        (status = 400, description = "Invalid signature or undecodable event")
    ),
    tag = "Stripe Webhooks"
)]
fn doc_webhook_handler() {}

#[utoipa::path(
    get,
    path = "/config",
    responses((status = 200, description = "Publishable key for the client", body = ConfigResponse)),
    tag = "Payment Intents"
)]
fn doc_config_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_payment_intent_handler,
        doc_resolve_last_payment_intent_handler,
        doc_create_setup_intent_handler,
        doc_capture_payment_intent_handler,
        doc_cancel_payment_intent_handler,
        doc_confirm_payment_intent_handler,
        doc_update_payment_intent_handler,
        doc_charge_saved_payment_method_handler,
        doc_webhook_handler,
        doc_config_handler
    ),
    components(
        schemas(
            CurrencyRequest, ResolveIntentRequest, CaptureIntentRequest, IntentIdRequest,
            UpdateIntentRequest, ChargeSavedMethodRequest,
            ClientSecretResponse, ResolvedIntentResponse, ChargeResponse, ConfigResponse,
            WebhookAck, WebhookEvent, WebhookEventData,
            IntentStatus, CaptureMethod, SetupFutureUsage
        )
    ),
    tags(
        (name = "Payment Intents", description = "Stripe payment intent demo endpoints"),
        (name = "Stripe Webhooks", description = "Stripe Server-to-Server Webhooks")
    )
)]
pub struct StripeApiDoc;
