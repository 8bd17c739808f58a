//! Environment variable handling for the Intentpay application.
//!
//! Configuration paths map onto `INTENTPAY__SECTION__KEY` variables. The
//! conventional Stripe variable names (`STRIPE_SECRET_KEY` and friends) are
//! honoured on top of that so a plain Stripe `.env` file works unchanged.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "INTENTPAY";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Conventional variable names and the configuration path each one overrides.
pub const CONVENTIONAL_OVERRIDES: &[(&str, &str)] = &[
    ("STRIPE_SECRET_KEY", "stripe.secret_key"),
    ("STRIPE_PUBLISHABLE_KEY", "stripe.publishable_key"),
    ("STRIPE_WEBHOOK_SECRET", "stripe.webhook_secret"),
    ("STRIPE_CUSTOMER_ID", "stripe.default_customer_id"),
    ("STATIC_DIR", "static_dir"),
];

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"stripe.secret_key"` becomes `"INTENTPAY__STRIPE__SECRET_KEY"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Collect the conventional overrides that are present and non-empty.
///
/// Returned pairs are `(config path, value)`.
pub fn conventional_overrides() -> Vec<(&'static str, String)> {
    collect_overrides(|name| env::var(name).ok())
}

fn collect_overrides<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    CONVENTIONAL_OVERRIDES
        .iter()
        .filter_map(|(name, path)| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (*path, value))
        })
        .collect()
}

/// Check if a path holds a secret and must not be logged.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret") || path_lower.ends_with("_key")
}
