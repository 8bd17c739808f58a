// --- File: crates/intentpay_stripe/src/projection.rs ---
//! Builds the creation request that replaces a stale payment intent.
//!
//! Every modelled intent field has exactly one entry in
//! [`FRESH_PAYMENT_POLICY`]. Fields marked `Drop` never reach the new intent,
//! so a new attribute on [`PaymentIntent`] cannot leak into a replacement
//! until someone decides its policy here.

use std::collections::BTreeMap;

use crate::models::{
    AutomaticPaymentMethods, CaptureMethod, CreateIntentParams, PaymentIntent, SetupFutureUsage,
};

/// The modelled attributes of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentField {
    Id,
    Amount,
    Currency,
    Status,
    Customer,
    CaptureMethod,
    SetupFutureUsage,
    AutomaticPaymentMethods,
    ClientSecret,
    Description,
    StatementDescriptor,
    StatementDescriptorSuffix,
    ReceiptEmail,
    Metadata,
    ApplicationFeeAmount,
    PaymentMethod,
    Created,
}

impl IntentField {
    pub const ALL: [IntentField; 17] = [
        IntentField::Id,
        IntentField::Amount,
        IntentField::Currency,
        IntentField::Status,
        IntentField::Customer,
        IntentField::CaptureMethod,
        IntentField::SetupFutureUsage,
        IntentField::AutomaticPaymentMethods,
        IntentField::ClientSecret,
        IntentField::Description,
        IntentField::StatementDescriptor,
        IntentField::StatementDescriptorSuffix,
        IntentField::ReceiptEmail,
        IntentField::Metadata,
        IntentField::ApplicationFeeAmount,
        IntentField::PaymentMethod,
        IntentField::Created,
    ];
}

/// What happens to a field when an intent is recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryOver {
    /// Take the old intent's value when it has one.
    Copy,
    /// Take the old intent's value only when it is a non-empty string.
    CopyIfNonEmpty,
    /// Ignore the old value and set a fixed one.
    Force,
    /// Leave unset on the new intent.
    Drop,
}

pub const FRESH_PAYMENT_POLICY: &[(IntentField, CarryOver)] = &[
    (IntentField::Id, CarryOver::Drop),
    (IntentField::Amount, CarryOver::Copy),
    (IntentField::Currency, CarryOver::Copy),
    (IntentField::Status, CarryOver::Drop),
    (IntentField::Customer, CarryOver::Copy),
    (IntentField::CaptureMethod, CarryOver::Force),
    (IntentField::SetupFutureUsage, CarryOver::Force),
    (IntentField::AutomaticPaymentMethods, CarryOver::Force),
    (IntentField::ClientSecret, CarryOver::Drop),
    (IntentField::Description, CarryOver::Copy),
    (IntentField::StatementDescriptor, CarryOver::Copy),
    (IntentField::StatementDescriptorSuffix, CarryOver::Copy),
    (IntentField::ReceiptEmail, CarryOver::CopyIfNonEmpty),
    (IntentField::Metadata, CarryOver::Copy),
    (IntentField::ApplicationFeeAmount, CarryOver::Copy),
    (IntentField::PaymentMethod, CarryOver::Drop),
    (IntentField::Created, CarryOver::Drop),
];

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Projects a stale intent onto a new creation request.
///
/// The result is never confirmed and carries no payment method, so the
/// customer picks one again.
pub fn fresh_payment_params(old: &PaymentIntent) -> CreateIntentParams {
    let mut params = CreateIntentParams::default();

    for &(field, policy) in FRESH_PAYMENT_POLICY {
        match (field, policy) {
            (_, CarryOver::Drop) => {}
            (IntentField::Amount, _) => params.amount = old.amount,
            (IntentField::Currency, _) => params.currency = old.currency.clone(),
            (IntentField::Customer, _) => params.customer = old.customer.clone(),
            (IntentField::Description, _) => params.description = old.description.clone(),
            (IntentField::StatementDescriptor, _) => {
                params.statement_descriptor = old.statement_descriptor.clone()
            }
            (IntentField::StatementDescriptorSuffix, _) => {
                params.statement_descriptor_suffix = old.statement_descriptor_suffix.clone()
            }
            (IntentField::ReceiptEmail, CarryOver::CopyIfNonEmpty) => {
                params.receipt_email = non_empty(&old.receipt_email)
            }
            (IntentField::ReceiptEmail, _) => params.receipt_email = old.receipt_email.clone(),
            (IntentField::Metadata, _) => {
                params.metadata = old
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<BTreeMap<_, _>>()
            }
            (IntentField::ApplicationFeeAmount, _) => {
                params.application_fee_amount = old.application_fee_amount
            }
            (IntentField::CaptureMethod, CarryOver::Force) => {
                params.capture_method = Some(CaptureMethod::Automatic)
            }
            (IntentField::SetupFutureUsage, CarryOver::Force) => {
                params.setup_future_usage = Some(SetupFutureUsage::OffSession)
            }
            (IntentField::AutomaticPaymentMethods, CarryOver::Force) => {
                params.automatic_payment_methods = Some(AutomaticPaymentMethods::without_redirects())
            }
            // Id, status, client secret, payment method and creation time are
            // owned by the gateway and are never sent on creation.
            _ => {}
        }
    }

    params
}
