// --- File: crates/intentpay_stripe/src/error.rs ---
use intentpay_common::{
    external_service_error, internal_error, validation_error, HttpStatusCode, IntentpayError,
};
use thiserror::Error;

/// Error code Stripe returns when an off-session payment needs the customer present.
pub const AUTHENTICATION_REQUIRED: &str = "authentication_required";

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError {
        status_code: u16,
        /// Machine-readable `error.code`, e.g. `authentication_required`.
        code: Option<String>,
        message: String,
        /// Id of the intent Stripe created before failing, if any.
        payment_intent_id: Option<String>,
    },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The inbound request body could not be decoded
    #[error("{0}")]
    MalformedBody(String),

    /// A request field is missing or out of range
    #[error("{0}")]
    ValidationError(String),

    /// The customer has no payment intent at all
    #[error("No payment intent found for customer {customer_id}")]
    NoPaymentIntent { customer_id: String },

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration error: {0}")]
    ConfigError(String),

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Verified webhook payload could not be decoded
    #[error("Stripe webhook payload error: {0}")]
    WebhookPayloadError(String),
}

impl StripeError {
    /// True when the gateway refused an off-session charge pending customer authentication.
    pub fn is_authentication_required(&self) -> bool {
        matches!(
            self,
            StripeError::ApiError { code: Some(code), .. } if code == AUTHENTICATION_REQUIRED
        )
    }

    /// Id of the partially created intent carried by an API error.
    pub fn payment_intent_id(&self) -> Option<&str> {
        match self {
            StripeError::ApiError {
                payment_intent_id, ..
            } => payment_intent_id.as_deref(),
            _ => None,
        }
    }
}

/// Convert StripeError to IntentpayError
impl From<StripeError> for IntentpayError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => external_service_error("Stripe API", e),
            StripeError::ApiError { message, .. } => external_service_error("Stripe API", message),
            StripeError::ParseError(e) => {
                external_service_error("Stripe API", format!("unreadable response: {}", e))
            }
            // Body decode failures are reported as 500, not 400.
            StripeError::MalformedBody(msg) => internal_error(msg),
            StripeError::ValidationError(msg) => validation_error(msg),
            // Reported as 500; see DESIGN.md on the 404 question.
            StripeError::NoPaymentIntent { customer_id } => internal_error(format!(
                "No payment intent found for customer {}",
                customer_id
            )),
            StripeError::ConfigError(msg) => IntentpayError::ConfigError(msg),
            StripeError::WebhookSignatureError(msg) => IntentpayError::SignatureError(msg),
            StripeError::WebhookPayloadError(msg) => IntentpayError::ParseError(msg),
        }
    }
}

/// Implement HttpStatusCode for StripeError to provide a consistent way to convert
/// StripeError to HTTP status codes.
impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 500,
            StripeError::ApiError { .. } => 500,
            StripeError::ParseError(_) => 500,
            StripeError::MalformedBody(_) => 500,
            StripeError::ValidationError(_) => 400,
            StripeError::NoPaymentIntent { .. } => 500,
            StripeError::ConfigError(_) => 500,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::WebhookPayloadError(_) => 400,
        }
    }
}
