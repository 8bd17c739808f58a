use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use tracing::{debug, info};

pub mod env_vars;
pub mod models;

pub use models::*;

use env_vars::{conventional_overrides, get_config_prefix, is_secret_path, CONFIG_SEPARATOR};

/// Loads the application configuration.
///
/// Sources, lowest precedence first:
/// 1. `config/default.*` (optional)
/// 2. `config/{RUN_ENV}.*` (optional, `RUN_ENV` defaults to `debug`)
/// 3. `INTENTPAY__SECTION__KEY` environment variables
/// 4. The conventional Stripe variables listed in [`env_vars::CONVENTIONAL_OVERRIDES`]
///
/// The result is immutable for the lifetime of the process; there is no reload.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let dotenv_path = ensure_dotenv_loaded();
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = get_config_prefix();
    debug!(dotenv = %dotenv_path, run_env = %run_env, prefix = %prefix, "Loading configuration");

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let builder = apply_overrides(builder, conventional_overrides())?;
    let config: AppConfig = builder.build()?.try_deserialize()?;
    validate(config)
}

/// Layers `(path, value)` overrides on top of the builder.
pub fn apply_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    overrides: Vec<(&str, String)>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (path, value) in overrides {
        if is_secret_path(path) {
            debug!(path, "Applying secret override from environment");
        } else {
            debug!(path, value = %value, "Applying override from environment");
        }
        builder = builder.set_override(path, value)?;
    }
    Ok(builder)
}

/// Rejects configurations the server cannot run with.
pub fn validate(config: AppConfig) -> Result<AppConfig, ConfigError> {
    if config.stripe.secret_key.trim().is_empty() {
        return Err(ConfigError::Message(
            "stripe.secret_key is empty; set STRIPE_SECRET_KEY".to_string(),
        ));
    }
    if config.stripe.request_timeout_secs == 0 {
        return Err(ConfigError::Message(
            "stripe.request_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.stripe.webhook_secret.trim().is_empty() {
        info!("stripe.webhook_secret is empty; every webhook will be rejected");
    }
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment exactly once.
///
/// `DOTENV_OVERRIDE` selects a different file; the default is `.env`. A
/// missing file is not an error. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
