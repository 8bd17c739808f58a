// --- File: crates/intentpay_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Intentpay errors.
///
/// Each feature crate converts its own error into this one with a
/// `From<SpecificError> for IntentpayError` impl; handlers then rely on the
/// `IntoResponse` impl in [`crate::http`] to render it.
#[derive(Error, Debug)]
pub enum IntentpayError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A signed payload could not be authenticated
    #[error("Signature error: {0}")]
    SignatureError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for IntentpayError {
    fn status_code(&self) -> u16 {
        match self {
            IntentpayError::ParseError(_) => 400,
            IntentpayError::ConfigError(_) => 500,
            IntentpayError::SignatureError(_) => 400,
            IntentpayError::ValidationError(_) => 400,
            // Gateway failures surface as 500 with the gateway's message.
            IntentpayError::ExternalServiceError { .. } => 500,
            IntentpayError::InternalError(_) => 500,
        }
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> IntentpayError {
    IntentpayError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> IntentpayError {
    IntentpayError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> IntentpayError {
    IntentpayError::InternalError(message.to_string())
}
