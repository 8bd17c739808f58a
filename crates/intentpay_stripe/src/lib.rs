// --- File: crates/intentpay_stripe/src/lib.rs ---

pub mod client;
pub mod doc;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod projection;
pub mod reconciler;
pub mod routes;
pub mod webhook;

// Re-export for main backend
pub use client::StripeClient;
pub use error::StripeError;
pub use gateway::{BoxFuture, PaymentGateway};
pub use handlers::StripeState;
pub use models::{IntentStatus, PaymentIntent, SetupIntent};
pub use reconciler::{ChargeRequest, IntentReconciler};
pub use routes::routes;
