// --- File: crates/intentpay_stripe/src/reconciler.rs ---
//! Keeps a customer's newest payment intent usable and charges saved
//! payment methods off-session.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::StripeError;
use crate::gateway::PaymentGateway;
use crate::models::{
    CancelParams, CaptureMethod, ConfirmIntentParams, CreateIntentParams, IntentStatus,
    PaymentIntent,
};
use crate::projection::fresh_payment_params;

/// A charge against a payment method saved earlier for a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub payment_method_id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub statement_descriptor: Option<String>,
    pub statement_descriptor_suffix: Option<String>,
}

impl ChargeRequest {
    fn create_params(&self, off_session: Option<bool>) -> CreateIntentParams {
        CreateIntentParams {
            amount: self.amount,
            currency: self.currency.clone(),
            customer: Some(self.customer_id.clone()),
            description: self.description.clone(),
            statement_descriptor: self.statement_descriptor.clone(),
            statement_descriptor_suffix: self.statement_descriptor_suffix.clone(),
            capture_method: Some(CaptureMethod::AutomaticAsync),
            payment_method: Some(self.payment_method_id.clone()),
            confirm: Some(true),
            off_session,
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct IntentReconciler {
    gateway: Arc<dyn PaymentGateway>,
}

impl IntentReconciler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the customer's active payment intent.
    ///
    /// Only the newest intent is considered. When it is stuck in
    /// `requires_payment_method` a replacement is created from it and the old
    /// one is cancelled; a failed cancellation is logged and ignored.
    ///
    /// Two concurrent calls for the same customer can both replace the same
    /// stale intent. Nothing here serializes them.
    pub async fn resolve_active_intent(
        &self,
        customer_id: &str,
    ) -> Result<PaymentIntent, StripeError> {
        let newest = self
            .gateway
            .list_intents_by_customer(customer_id, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StripeError::NoPaymentIntent {
                customer_id: customer_id.to_string(),
            })?;

        if newest.status != IntentStatus::RequiresPaymentMethod {
            info!(
                customer_id,
                intent_id = %newest.id,
                status = newest.status.as_str(),
                terminal = newest.status.is_terminal(),
                "Newest payment intent is usable as-is"
            );
            return Ok(newest);
        }

        let fresh = self
            .gateway
            .create_intent(fresh_payment_params(&newest))
            .await?;
        info!(
            customer_id,
            stale_intent_id = %newest.id,
            intent_id = %fresh.id,
            "Replaced payment intent awaiting a payment method"
        );

        if let Err(e) = self
            .gateway
            .cancel_intent(&newest.id, CancelParams::abandoned())
            .await
        {
            warn!(
                intent_id = %newest.id,
                error = %e,
                "Failed to cancel stale payment intent"
            );
        }

        Ok(fresh)
    }

    /// Charges a saved payment method, retrying on-session when the gateway
    /// requires customer authentication.
    ///
    /// The first attempt confirms off-session. On `authentication_required`
    /// the partially created intent is confirmed on-session when the error
    /// names it, otherwise a second intent is created without `off_session`.
    /// `requires_action` is a normal result: the client finishes it.
    pub async fn charge_with_fallback(
        &self,
        request: &ChargeRequest,
    ) -> Result<PaymentIntent, StripeError> {
        let first = self
            .gateway
            .create_intent(request.create_params(Some(true)))
            .await;

        let err = match first {
            Ok(intent) => {
                info!(
                    customer_id = %request.customer_id,
                    intent_id = %intent.id,
                    status = intent.status.as_str(),
                    "Off-session charge submitted"
                );
                return Ok(intent);
            }
            Err(e) if e.is_authentication_required() => e,
            Err(e) => return Err(e),
        };

        let retried = match err.payment_intent_id() {
            Some(intent_id) => {
                info!(
                    customer_id = %request.customer_id,
                    intent_id,
                    "Authentication required, confirming on-session"
                );
                let params = ConfirmIntentParams {
                    payment_method: Some(request.payment_method_id.clone()),
                    capture_method: Some(CaptureMethod::AutomaticAsync),
                    off_session: Some(false),
                };
                self.gateway.confirm_intent(intent_id, params).await?
            }
            None => {
                info!(
                    customer_id = %request.customer_id,
                    "Authentication required, creating on-session intent"
                );
                self.gateway
                    .create_intent(request.create_params(None))
                    .await?
            }
        };

        info!(
            intent_id = %retried.id,
            status = retried.status.as_str(),
            "On-session charge submitted"
        );
        Ok(retried)
    }
}
