// --- File: crates/intentpay_stripe/src/gateway.rs ---
//! Gateway abstraction over the payment intent endpoints.
//!
//! Handlers and the reconciler only see `dyn PaymentGateway`, so tests can
//! swap the HTTP client for an in-memory fake.

use std::future::Future;
use std::pin::Pin;

use crate::error::StripeError;
use crate::models::{
    CancelParams, CaptureParams, ConfirmIntentParams, CreateIntentParams,
    CreateSetupIntentParams, PaymentIntent, SetupIntent, UpdateIntentParams,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Operations the demo needs from the payment provider.
pub trait PaymentGateway: Send + Sync {
    fn create_intent(&self, params: CreateIntentParams)
        -> BoxFuture<'_, PaymentIntent, StripeError>;

    fn update_intent(
        &self,
        intent_id: &str,
        params: UpdateIntentParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError>;

    fn get_intent(&self, intent_id: &str) -> BoxFuture<'_, PaymentIntent, StripeError>;

    /// Intents for a customer, newest first.
    fn list_intents_by_customer(
        &self,
        customer_id: &str,
        limit: u8,
    ) -> BoxFuture<'_, Vec<PaymentIntent>, StripeError>;

    fn capture_intent(
        &self,
        intent_id: &str,
        params: CaptureParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError>;

    fn cancel_intent(
        &self,
        intent_id: &str,
        params: CancelParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError>;

    fn confirm_intent(
        &self,
        intent_id: &str,
        params: ConfirmIntentParams,
    ) -> BoxFuture<'_, PaymentIntent, StripeError>;

    fn create_setup_intent(
        &self,
        params: CreateSetupIntentParams,
    ) -> BoxFuture<'_, SetupIntent, StripeError>;
}
