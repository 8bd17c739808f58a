// --- File: crates/intentpay_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// --- Stripe Config ---
// Secrets are usually injected from STRIPE_SECRET_KEY / STRIPE_PUBLISHABLE_KEY / STRIPE_WEBHOOK_SECRET.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub publishable_key: String,
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Upper bound for a single outbound gateway call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum accepted age of a webhook signature timestamp.
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: i64,
    /// Customer used by the demo pre-authorization and setup-intent endpoints.
    #[serde(default)]
    pub default_customer_id: String,
    /// Amount held by `/create-payment-intent`, in minor currency units.
    #[serde(default = "default_preauth_amount")]
    pub preauth_amount: i64,
    #[serde(default = "default_statement_descriptor")]
    pub statement_descriptor: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            publishable_key: String::new(),
            webhook_secret: String::new(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            webhook_tolerance_secs: default_webhook_tolerance_secs(),
            default_customer_id: String::new(),
            preauth_amount: default_preauth_amount(),
            statement_descriptor: default_statement_descriptor(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    /// Directory served at `/` for the client pages.
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4242
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_webhook_tolerance_secs() -> i64 {
    300
}

fn default_preauth_amount() -> i64 {
    100
}

fn default_statement_descriptor() -> String {
    "firebolt".to_string()
}
