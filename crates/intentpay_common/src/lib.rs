// --- File: crates/intentpay_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    IntentpayError,
    HttpStatusCode,
    validation_error,
    external_service_error,
    internal_error,
};

// Re-export HTTP utilities for easier access
pub use http::{
    IntoHttpResponse,
    client::create_client,
};
