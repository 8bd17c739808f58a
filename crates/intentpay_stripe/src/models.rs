// --- File: crates/intentpay_stripe/src/models.rs ---
//! Payment intent and setup intent shapes as the Stripe API returns them, plus
//! the request parameter types sent back to it.
//!
//! Parameter types encode themselves as the bracketed form fields Stripe
//! expects (`automatic_payment_methods[enabled]=true`, `metadata[key]=value`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Enumerations ---

/// Lifecycle state of a payment intent.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Succeeded,
    Canceled,
}

impl IntentStatus {
    /// `succeeded` and `canceled` intents never take part in another charge attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, IntentStatus::Succeeded | IntentStatus::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Canceled => "canceled",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CaptureMethod {
    Manual,
    #[default]
    Automatic,
    AutomaticAsync,
}

impl CaptureMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureMethod::Manual => "manual",
            CaptureMethod::Automatic => "automatic",
            CaptureMethod::AutomaticAsync => "automatic_async",
        }
    }
}

/// Whether the payment method is kept for later charges. Absent means none.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SetupFutureUsage {
    OffSession,
    OnSession,
}

impl SetupFutureUsage {
    pub fn as_str(self) -> &'static str {
        match self {
            SetupFutureUsage::OffSession => "off_session",
            SetupFutureUsage::OnSession => "on_session",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowRedirects {
    Always,
    Never,
}

impl AllowRedirects {
    pub fn as_str(self) -> &'static str {
        match self {
            AllowRedirects::Always => "always",
            AllowRedirects::Never => "never",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Duplicate,
    Fraudulent,
    RequestedByCustomer,
    Abandoned,
}

impl CancellationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CancellationReason::Duplicate => "duplicate",
            CancellationReason::Fraudulent => "fraudulent",
            CancellationReason::RequestedByCustomer => "requested_by_customer",
            CancellationReason::Abandoned => "abandoned",
        }
    }
}

// --- Gateway objects ---

/// A payment intent as returned by the gateway.
///
/// Fields not modelled here are kept in `extra` so the object serializes back
/// with every attribute the gateway sent.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: IntentStatus,
    pub customer: Option<String>,
    #[serde(default)]
    pub capture_method: CaptureMethod,
    pub setup_future_usage: Option<SetupFutureUsage>,
    pub client_secret: Option<String>,
    pub description: Option<String>,
    pub statement_descriptor: Option<String>,
    pub statement_descriptor_suffix: Option<String>,
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub application_fee_amount: Option<i64>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A setup intent as returned by the gateway.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SetupIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
    pub customer: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Represents the list object returned by Stripe API.
#[derive(Deserialize, Serialize, Debug)]
pub struct StripeListObject<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

// --- Request parameters ---

type FormBody = Vec<(String, String)>;

fn push(form: &mut FormBody, key: &str, value: impl Into<String>) {
    form.push((key.to_string(), value.into()));
}

fn push_opt_str(form: &mut FormBody, key: &str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        push(form, key, v);
    }
}

fn push_opt_bool(form: &mut FormBody, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        push(form, key, v.to_string());
    }
}

fn push_metadata(form: &mut FormBody, metadata: &BTreeMap<String, String>) {
    for (key, value) in metadata {
        push(form, &format!("metadata[{}]", key), value.as_str());
    }
}

/// `automatic_payment_methods` block of a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomaticPaymentMethods {
    pub enabled: bool,
    pub allow_redirects: Option<AllowRedirects>,
}

impl AutomaticPaymentMethods {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            allow_redirects: None,
        }
    }

    pub fn without_redirects() -> Self {
        Self {
            enabled: true,
            allow_redirects: Some(AllowRedirects::Never),
        }
    }

    fn write(&self, form: &mut FormBody) {
        push(form, "automatic_payment_methods[enabled]", self.enabled.to_string());
        if let Some(redirects) = self.allow_redirects {
            push(form, "automatic_payment_methods[allow_redirects]", redirects.as_str());
        }
    }
}

/// Parameters for `POST /v1/payment_intents`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIntentParams {
    pub amount: i64,
    pub currency: String,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub statement_descriptor: Option<String>,
    pub statement_descriptor_suffix: Option<String>,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub application_fee_amount: Option<i64>,
    pub capture_method: Option<CaptureMethod>,
    pub setup_future_usage: Option<SetupFutureUsage>,
    pub automatic_payment_methods: Option<AutomaticPaymentMethods>,
    pub payment_method: Option<String>,
    pub confirm: Option<bool>,
    pub off_session: Option<bool>,
}

impl CreateIntentParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        push(&mut form, "amount", self.amount.to_string());
        push(&mut form, "currency", self.currency.to_lowercase());
        push_opt_str(&mut form, "customer", &self.customer);
        push_opt_str(&mut form, "description", &self.description);
        push_opt_str(&mut form, "statement_descriptor", &self.statement_descriptor);
        push_opt_str(
            &mut form,
            "statement_descriptor_suffix",
            &self.statement_descriptor_suffix,
        );
        push_opt_str(&mut form, "receipt_email", &self.receipt_email);
        push_metadata(&mut form, &self.metadata);
        if let Some(fee) = self.application_fee_amount {
            push(&mut form, "application_fee_amount", fee.to_string());
        }
        if let Some(method) = self.capture_method {
            push(&mut form, "capture_method", method.as_str());
        }
        if let Some(usage) = self.setup_future_usage {
            push(&mut form, "setup_future_usage", usage.as_str());
        }
        if let Some(apm) = &self.automatic_payment_methods {
            apm.write(&mut form);
        }
        push_opt_str(&mut form, "payment_method", &self.payment_method);
        push_opt_bool(&mut form, "confirm", self.confirm);
        push_opt_bool(&mut form, "off_session", self.off_session);
        form
    }
}

/// Parameters for `POST /v1/payment_intents/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateIntentParams {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub statement_descriptor: Option<String>,
    pub statement_descriptor_suffix: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl UpdateIntentParams {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(amount) = self.amount {
            push(&mut form, "amount", amount.to_string());
        }
        if let Some(currency) = &self.currency {
            push(&mut form, "currency", currency.to_lowercase());
        }
        push_opt_str(&mut form, "payment_method", &self.payment_method);
        push_opt_str(&mut form, "description", &self.description);
        push_opt_str(&mut form, "statement_descriptor", &self.statement_descriptor);
        push_opt_str(
            &mut form,
            "statement_descriptor_suffix",
            &self.statement_descriptor_suffix,
        );
        push_metadata(&mut form, &self.metadata);
        form
    }
}

/// Parameters for `POST /v1/payment_intents/{id}/confirm`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmIntentParams {
    pub payment_method: Option<String>,
    pub capture_method: Option<CaptureMethod>,
    pub off_session: Option<bool>,
}

impl ConfirmIntentParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        push_opt_str(&mut form, "payment_method", &self.payment_method);
        if let Some(method) = self.capture_method {
            push(&mut form, "capture_method", method.as_str());
        }
        push_opt_bool(&mut form, "off_session", self.off_session);
        form
    }
}

/// Parameters for `POST /v1/payment_intents/{id}/capture`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureParams {
    pub amount_to_capture: Option<i64>,
}

impl CaptureParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(amount) = self.amount_to_capture {
            push(&mut form, "amount_to_capture", amount.to_string());
        }
        form
    }
}

/// Parameters for `POST /v1/payment_intents/{id}/cancel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelParams {
    pub cancellation_reason: Option<CancellationReason>,
}

impl CancelParams {
    pub fn abandoned() -> Self {
        Self {
            cancellation_reason: Some(CancellationReason::Abandoned),
        }
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(reason) = self.cancellation_reason {
            push(&mut form, "cancellation_reason", reason.as_str());
        }
        form
    }
}

/// Parameters for `POST /v1/setup_intents`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateSetupIntentParams {
    pub customer: Option<String>,
    pub description: Option<String>,
    pub automatic_payment_methods: Option<AutomaticPaymentMethods>,
}

impl CreateSetupIntentParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        push_opt_str(&mut form, "customer", &self.customer);
        push_opt_str(&mut form, "description", &self.description);
        if let Some(apm) = &self.automatic_payment_methods {
            apm.write(&mut form);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_payment_intent_keeps_unmodelled_fields() {
        let raw = json!({
            "id": "pi_x",
            "object": "payment_intent",
            "amount": 500,
            "amount_received": 500,
            "currency": "usd",
            "status": "succeeded",
            "customer": "cus_1",
            "capture_method": "manual",
            "setup_future_usage": null,
            "client_secret": "pi_x_secret_1",
            "description": null,
            "statement_descriptor": null,
            "statement_descriptor_suffix": null,
            "receipt_email": null,
            "metadata": {},
            "application_fee_amount": null,
            "payment_method": "pm_1",
            "created": 1700000000,
            "livemode": false
        });

        let intent: PaymentIntent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(intent.capture_method, CaptureMethod::Manual);
        assert_eq!(intent.extra.get("amount_received"), Some(&json!(500)));

        assert_eq!(serde_json::to_value(&intent).unwrap(), raw);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(IntentStatus::Succeeded.is_terminal());
        assert!(IntentStatus::Canceled.is_terminal());
        assert!(!IntentStatus::RequiresPaymentMethod.is_terminal());
        assert!(!IntentStatus::RequiresCapture.is_terminal());
    }

    #[test]
    fn test_create_params_form_fields() {
        let mut metadata = BTreeMap::new();
        metadata.insert("order".to_string(), "4137591".to_string());
        let params = CreateIntentParams {
            amount: 310,
            currency: "USD".to_string(),
            customer: Some("cus_1".to_string()),
            receipt_email: Some(String::new()),
            metadata,
            capture_method: Some(CaptureMethod::AutomaticAsync),
            automatic_payment_methods: Some(AutomaticPaymentMethods::without_redirects()),
            payment_method: Some("pm_1".to_string()),
            confirm: Some(true),
            off_session: Some(true),
            ..Default::default()
        };

        let form = params.to_form();
        assert_eq!(field(&form, "amount"), Some("310"));
        assert_eq!(field(&form, "currency"), Some("usd"));
        assert_eq!(field(&form, "metadata[order]"), Some("4137591"));
        assert_eq!(field(&form, "capture_method"), Some("automatic_async"));
        assert_eq!(field(&form, "automatic_payment_methods[enabled]"), Some("true"));
        assert_eq!(
            field(&form, "automatic_payment_methods[allow_redirects]"),
            Some("never")
        );
        assert_eq!(field(&form, "confirm"), Some("true"));
        assert_eq!(field(&form, "off_session"), Some("true"));
        // Empty strings are not sent.
        assert_eq!(field(&form, "receipt_email"), None);
        assert_eq!(field(&form, "setup_future_usage"), None);
    }

    #[test]
    fn test_confirm_params_send_explicit_on_session() {
        let form = ConfirmIntentParams {
            payment_method: Some("pm_1".to_string()),
            capture_method: Some(CaptureMethod::AutomaticAsync),
            off_session: Some(false),
        }
        .to_form();
        assert_eq!(field(&form, "off_session"), Some("false"));
        assert_eq!(field(&form, "payment_method"), Some("pm_1"));
    }

    #[test]
    fn test_cancel_and_capture_params() {
        let cancel = CancelParams::abandoned().to_form();
        assert_eq!(field(&cancel, "cancellation_reason"), Some("abandoned"));

        let capture = CaptureParams {
            amount_to_capture: Some(500),
        }
        .to_form();
        assert_eq!(field(&capture, "amount_to_capture"), Some("500"));
        assert!(CaptureParams::default().to_form().is_empty());
    }

    #[test]
    fn test_update_params_only_send_set_fields() {
        assert!(UpdateIntentParams::default().is_empty());
        let form = UpdateIntentParams {
            amount: Some(400),
            ..Default::default()
        }
        .to_form();
        assert_eq!(form, vec![("amount".to_string(), "400".to_string())]);
    }
}
