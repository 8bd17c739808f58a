// --- File: crates/intentpay_stripe/src/client.rs ---
//! `PaymentGateway` backed by the Stripe REST API.

use intentpay_common::create_client;
use intentpay_config::StripeConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StripeError;
use crate::gateway::{BoxFuture, PaymentGateway};
use crate::models::{
    CancelParams, CaptureParams, ConfirmIntentParams, CreateIntentParams,
    CreateSetupIntentParams, PaymentIntent, SetupIntent, StripeListObject, UpdateIntentParams,
};

/// Thin client for the `/v1/payment_intents` and `/v1/setup_intents` endpoints.
#[derive(Clone, Debug)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        if config.secret_key.trim().is_empty() {
            return Err(StripeError::ConfigError(
                "Stripe secret key is not set".to_string(),
            ));
        }
        let http = create_client(config.request_timeout_secs, false)?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Vec<(String, String)>,
    ) -> Result<T, StripeError> {
        debug!("[Stripe] POST /v1/{} ({} fields)", path, form.len());
        let response = self
            .http
            .post(self.url(path))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;
        read_response(path, response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, StripeError> {
        debug!("[Stripe] GET /v1/{}", path);
        let response = self
            .http
            .get(self.url(path))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(query)
            .send()
            .await?;
        read_response(path, response).await
    }
}

async fn read_response<T: DeserializeOwned>(
    path: &str,
    response: Response,
) -> Result<T, StripeError> {
    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        Ok(serde_json::from_str(&body_text)?)
    } else {
        let err = parse_api_error(status.as_u16(), &body_text);
        warn!("[Stripe] /v1/{} failed: {}", path, err);
        Err(err)
    }
}

/// Builds an `ApiError` from an error response body.
///
/// Stripe wraps failures as `{"error": {"message", "code", "payment_intent"}}`;
/// anything else is kept verbatim as the message.
pub fn parse_api_error(status_code: u16, body_text: &str) -> StripeError {
    let parsed = serde_json::from_str::<Value>(body_text).ok();
    let error = parsed.as_ref().and_then(|body| body.get("error"));
    let text = |key: &str| {
        error
            .and_then(|e| e.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    StripeError::ApiError {
        status_code,
        code: text("code"),
        message: text("message").unwrap_or_else(|| body_text.to_string()),
        payment_intent_id: error
            .and_then(|e| e.get("payment_intent"))
            .and_then(|pi| pi.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

impl PaymentGateway for StripeClient {
    fn create_intent(
        &self,
        params: CreateIntentParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError> {
        Box::pin(async move {
            let intent: PaymentIntent = self.post_form("payment_intents", params.to_form()).await?;
            info!("[Stripe] Created payment intent {} ({})", intent.id, intent.status.as_str());
            Ok(intent)
        })
    }

    fn update_intent(
        &self,
        intent_id: &str,
        params: UpdateIntentParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError> {
        let path = format!("payment_intents/{}", intent_id);
        Box::pin(async move { self.post_form(&path, params.to_form()).await })
    }

    fn get_intent(&self, intent_id: &str) -> BoxFuture<'_, PaymentIntent, StripeError> {
        let path = format!("payment_intents/{}", intent_id);
        Box::pin(async move { self.get_json(&path, &[]).await })
    }

    fn list_intents_by_customer(
        &self,
        customer_id: &str,
        limit: u8,
    ) -> BoxFuture<'_, Vec<PaymentIntent>, StripeError> {
        let query = vec![
            ("customer", customer_id.to_string()),
            ("limit", limit.to_string()),
        ];
        Box::pin(async move {
            let list: StripeListObject<PaymentIntent> =
                self.get_json("payment_intents", &query).await?;
            Ok(list.data)
        })
    }

    fn capture_intent(
        &self,
        intent_id: &str,
        params: CaptureParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError> {
        let path = format!("payment_intents/{}/capture", intent_id);
        Box::pin(async move { self.post_form(&path, params.to_form()).await })
    }

    fn cancel_intent(
        &self,
        intent_id: &str,
        params: CancelParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError> {
        let path = format!("payment_intents/{}/cancel", intent_id);
        Box::pin(async move { self.post_form(&path, params.to_form()).await })
    }

    fn confirm_intent(
        &self,
        intent_id: &str,
        params: ConfirmIntentParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError> {
        let path = format!("payment_intents/{}/confirm", intent_id);
        Box::pin(async move { self.post_form(&path, params.to_form()).await })
    }

    fn create_setup_intent(
        &self,
        params: CreateSetupIntentParams,
    ) -> BoxFuture<'_, SetupIntent, StripeError> {
        Box::pin(async move { self.post_form("setup_intents", params.to_form()).await })
    }
}
