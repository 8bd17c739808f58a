// --- File: crates/intentpay_stripe/src/routes.rs ---

use crate::gateway::PaymentGateway;
use crate::handlers::{
    cancel_payment_intent_handler, capture_payment_intent_handler,
    charge_saved_payment_method_handler, config_handler, confirm_payment_intent_handler,
    create_payment_intent_handler, create_setup_intent_handler,
    resolve_last_payment_intent_handler, update_payment_intent_handler, webhook_handler,
    StripeState,
};
use axum::{
    routing::{get, post},
    Router,
};
use intentpay_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all payment intent routes.
///
/// Routes only accept the listed method; anything else gets axum's 405.
pub fn routes(config: Arc<AppConfig>, gateway: Arc<dyn PaymentGateway>) -> Router {
    let stripe_state = Arc::new(StripeState::new(config, gateway));

    Router::new()
        .route("/create-payment-intent", post(create_payment_intent_handler))
        .route(
            "/resolve-last-payment-intent",
            post(resolve_last_payment_intent_handler),
        )
        .route("/create-setup-intent", post(create_setup_intent_handler))
        .route("/capture-payment-intent", post(capture_payment_intent_handler))
        .route("/cancel-payment-intent", post(cancel_payment_intent_handler))
        .route("/confirm-payment-intent", post(confirm_payment_intent_handler))
        .route("/update-payment-intent", post(update_payment_intent_handler))
        .route(
            "/charge-saved-payment-method",
            post(charge_saved_payment_method_handler),
        )
        // Stripe server-to-server notifications
        .route("/webhook", post(webhook_handler))
        .route("/config", get(config_handler))
        .with_state(stripe_state)
}
