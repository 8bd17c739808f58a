// --- File: crates/intentpay_stripe/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
};
use intentpay_common::IntentpayError;
use intentpay_config::AppConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::StripeError;
use crate::gateway::PaymentGateway;
use crate::models::{
    AutomaticPaymentMethods, CancelParams, CaptureMethod, CaptureParams, CreateIntentParams,
    CreateSetupIntentParams, PaymentIntent, SetupFutureUsage, UpdateIntentParams,
};
use crate::reconciler::{ChargeRequest, IntentReconciler};
use crate::webhook::{construct_event, dispatch, SIGNATURE_HEADER};

const DEFAULT_CURRENCY: &str = "USD";
const PREAUTH_SUFFIX: &str = "pre-auth";
const SETUP_INTENT_DESCRIPTION: &str = "Capture payment details for future use";

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub reconciler: IntentReconciler,
}

impl StripeState {
    pub fn new(config: Arc<AppConfig>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let reconciler = IntentReconciler::new(gateway.clone());
        Self {
            config,
            gateway,
            reconciler,
        }
    }

    fn publishable_key(&self) -> String {
        self.config.stripe.publishable_key.clone()
    }

    fn demo_customer(&self) -> Option<String> {
        Some(self.config.stripe.default_customer_id.clone()).filter(|id| !id.is_empty())
    }
}

// --- Request bodies ---

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Body of `/create-payment-intent` and `/create-setup-intent`.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CurrencyRequest {
    #[serde(default = "default_currency")]
    #[cfg_attr(feature = "openapi", schema(example = "USD"))]
    pub currency: String,
    /// Accepted for client compatibility; pricing happens server-side.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl Default for CurrencyRequest {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            items: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ResolveIntentRequest {
    #[serde(rename = "customerID", default)]
    #[cfg_attr(feature = "openapi", schema(example = "cus_R88nCQ6UTjjC2u"))]
    pub customer_id: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CaptureIntentRequest {
    #[serde(rename = "paymentIntentID", default)]
    #[cfg_attr(feature = "openapi", schema(example = "pi_3QA7SMAJlbf9cOtY0lJlpoyQ"))]
    pub payment_intent_id: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = 100))]
    pub amount: i64,
}

/// Body of `/cancel-payment-intent` and `/confirm-payment-intent`.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct IntentIdRequest {
    #[serde(rename = "paymentIntentID", default)]
    #[cfg_attr(feature = "openapi", schema(example = "pi_3QA7SMAJlbf9cOtY0lJlpoyQ"))]
    pub payment_intent_id: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateIntentRequest {
    #[serde(rename = "paymentIntentID", default)]
    pub payment_intent_id: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(rename = "paymentMethodID")]
    pub payment_method_id: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "statementDescriptorSuffix")]
    pub statement_descriptor_suffix: Option<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChargeSavedMethodRequest {
    #[serde(rename = "customerID", default)]
    pub customer_id: String,
    #[serde(rename = "paymentMethodID", default)]
    pub payment_method_id: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = 400))]
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub description: Option<String>,
    #[serde(rename = "statementDescriptorSuffix")]
    pub statement_descriptor_suffix: Option<String>,
}

// --- Response bodies ---

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub public_key: String,
    pub client_secret: String,
    pub id: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIntentResponse {
    pub amount: i64,
    pub public_key: String,
    pub client_secret: String,
    pub id: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub public_key: String,
    pub client_secret: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WebhookAck {
    pub status: String,
}

// --- Body decoding ---

/// Decodes a JSON body. An empty body is malformed.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, StripeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(StripeError::MalformedBody("EOF".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| StripeError::MalformedBody(e.to_string()))
}

/// Like [`decode_body`], but an empty body yields `T::default()`.
fn decode_body_or_default<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, StripeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    decode_body(body)
}

fn require(value: &str, field: &str) -> Result<(), StripeError> {
    if value.trim().is_empty() {
        Err(StripeError::ValidationError(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

fn require_positive(amount: i64) -> Result<(), StripeError> {
    if amount <= 0 {
        Err(StripeError::ValidationError(
            "amount must be greater than zero".to_string(),
        ))
    } else {
        Ok(())
    }
}

fn preauth_description(amount: i64, currency: &str) -> String {
    format!(
        "Pre-authorize {}.{:02} {} to return it back after confirmation",
        amount / 100,
        amount % 100,
        currency.to_uppercase()
    )
}

// --- Handlers ---

/// Places a hold of the configured pre-authorization amount.
#[axum::debug_handler]
pub async fn create_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<ClientSecretResponse>, IntentpayError> {
    let mut request: CurrencyRequest = decode_body_or_default(&body)?;
    if request.currency.trim().is_empty() {
        request.currency = default_currency();
    }

    let stripe = &state.config.stripe;
    let params = CreateIntentParams {
        amount: stripe.preauth_amount,
        currency: request.currency.clone(),
        customer: state.demo_customer(),
        description: Some(preauth_description(stripe.preauth_amount, &request.currency)),
        statement_descriptor: Some(stripe.statement_descriptor.clone()),
        statement_descriptor_suffix: Some(PREAUTH_SUFFIX.to_string()),
        capture_method: Some(CaptureMethod::Manual),
        setup_future_usage: Some(SetupFutureUsage::OffSession),
        automatic_payment_methods: Some(AutomaticPaymentMethods::enabled()),
        ..Default::default()
    };

    let intent = state.gateway.create_intent(params).await?;
    Ok(Json(ClientSecretResponse {
        public_key: state.publishable_key(),
        client_secret: intent.client_secret.unwrap_or_default(),
        id: intent.id,
    }))
}

#[axum::debug_handler]
pub async fn resolve_last_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<ResolvedIntentResponse>, IntentpayError> {
    let request: ResolveIntentRequest = decode_body(&body)?;
    require(&request.customer_id, "customerID")?;

    let intent = state
        .reconciler
        .resolve_active_intent(&request.customer_id)
        .await?;
    Ok(Json(ResolvedIntentResponse {
        amount: intent.amount,
        public_key: state.publishable_key(),
        client_secret: intent.client_secret.unwrap_or_default(),
        id: intent.id,
    }))
}

#[axum::debug_handler]
pub async fn create_setup_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<ClientSecretResponse>, IntentpayError> {
    let _request: CurrencyRequest = decode_body(&body)?;

    let params = CreateSetupIntentParams {
        customer: state.demo_customer(),
        description: Some(SETUP_INTENT_DESCRIPTION.to_string()),
        automatic_payment_methods: Some(AutomaticPaymentMethods::enabled()),
    };
    let setup_intent = state.gateway.create_setup_intent(params).await?;
    info!(setup_intent_id = %setup_intent.id, "Created setup intent");

    Ok(Json(ClientSecretResponse {
        public_key: state.publishable_key(),
        client_secret: setup_intent.client_secret.unwrap_or_default(),
        id: setup_intent.id,
    }))
}

/// Captures exactly `amount` and returns the gateway's intent as-is.
#[axum::debug_handler]
pub async fn capture_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<PaymentIntent>, IntentpayError> {
    let request: CaptureIntentRequest = decode_body(&body)?;
    require(&request.payment_intent_id, "paymentIntentID")?;
    require_positive(request.amount)?;

    let params = CaptureParams {
        amount_to_capture: Some(request.amount),
    };
    let intent = state
        .gateway
        .capture_intent(&request.payment_intent_id, params)
        .await?;
    info!(intent_id = %intent.id, amount = request.amount, "Captured payment intent");
    Ok(Json(intent))
}

#[axum::debug_handler]
pub async fn cancel_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<PaymentIntent>, IntentpayError> {
    let request: IntentIdRequest = decode_body(&body)?;
    require(&request.payment_intent_id, "paymentIntentID")?;

    let intent = state
        .gateway
        .cancel_intent(&request.payment_intent_id, CancelParams::abandoned())
        .await?;
    info!(intent_id = %intent.id, "Cancelled payment intent");
    Ok(Json(intent))
}

/// Returns the client secret so the browser can confirm the intent itself.
#[axum::debug_handler]
pub async fn confirm_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<ClientSecretResponse>, IntentpayError> {
    let request: IntentIdRequest = decode_body(&body)?;
    require(&request.payment_intent_id, "paymentIntentID")?;

    let intent = state.gateway.get_intent(&request.payment_intent_id).await?;
    Ok(Json(ClientSecretResponse {
        public_key: state.publishable_key(),
        client_secret: intent.client_secret.unwrap_or_default(),
        id: intent.id,
    }))
}

#[axum::debug_handler]
pub async fn update_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<PaymentIntent>, IntentpayError> {
    let request: UpdateIntentRequest = decode_body(&body)?;
    require(&request.payment_intent_id, "paymentIntentID")?;
    if let Some(amount) = request.amount {
        require_positive(amount)?;
    }

    let params = UpdateIntentParams {
        amount: request.amount,
        currency: request.currency,
        payment_method: request.payment_method_id,
        description: request.description,
        statement_descriptor_suffix: request.statement_descriptor_suffix,
        ..Default::default()
    };
    if params.is_empty() {
        return Err(StripeError::ValidationError("nothing to update".to_string()).into());
    }

    let intent = state
        .gateway
        .update_intent(&request.payment_intent_id, params)
        .await?;
    Ok(Json(intent))
}

#[axum::debug_handler]
pub async fn charge_saved_payment_method_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<ChargeResponse>, IntentpayError> {
    let request: ChargeSavedMethodRequest = decode_body(&body)?;
    require(&request.customer_id, "customerID")?;
    require(&request.payment_method_id, "paymentMethodID")?;
    require_positive(request.amount)?;

    let charge = ChargeRequest {
        customer_id: request.customer_id,
        payment_method_id: request.payment_method_id,
        amount: request.amount,
        currency: request.currency,
        description: request.description,
        statement_descriptor: Some(state.config.stripe.statement_descriptor.clone()),
        statement_descriptor_suffix: request.statement_descriptor_suffix,
    };
    let intent = state.reconciler.charge_with_fallback(&charge).await?;

    Ok(Json(ChargeResponse {
        id: intent.id,
        status: intent.status.as_str().to_string(),
        amount: intent.amount,
        public_key: state.publishable_key(),
        client_secret: intent.client_secret.unwrap_or_default(),
    }))
}

/// Verifies and dispatches a Stripe webhook. Works on the raw body so the
/// signature is checked against the exact bytes Stripe signed.
#[axum::debug_handler]
pub async fn webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, IntentpayError> {
    let sig_header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    let stripe = &state.config.stripe;

    let event = construct_event(
        &body,
        sig_header,
        &stripe.webhook_secret,
        stripe.webhook_tolerance_secs,
    )?;
    debug!(event_id = %event.id, event_type = %event.event_type, "Webhook signature verified");

    dispatch(&event)?;
    Ok(Json(WebhookAck {
        status: "success".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn config_handler(State(state): State<Arc<StripeState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        publishable_key: state.publishable_key(),
    })
}
