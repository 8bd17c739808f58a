// --- File: crates/intentpay_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::{HttpStatusCode, IntentpayError};

// Include the client module
pub mod client;

/// Extension trait for IntentpayError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for IntentpayError {
    /// Renders the error as a plain-text body with the mapped status code.
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();
        if status_code.is_server_error() {
            error!(status = status_code.as_u16(), "{}", error_message);
        }

        (status_code, error_message).into_response()
    }
}

/// Implement IntoResponse for IntentpayError to make it easier to use in Axum handlers.
impl IntoResponse for IntentpayError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
