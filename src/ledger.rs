//! Registration ledger: the per-registration payment state machine.
//!
//! States: `Pending` (initial for priced tickets), `Paid` (initial for free
//! tickets, or reached explicitly), `Refunded` (terminal). Allowed
//! transitions: `Pending -> Paid`, `Pending -> Refunded`, `Paid -> Refunded`.
//! Everything else, self-transitions included, is rejected and leaves the
//! record untouched.

use crate::error::Error;
use crate::types::{Money, PaymentMethod, PaymentRecord, PaymentStatus, PaymentUpdate};
use chrono::{DateTime, Utc};

/// Initial payment status for a registration at the given price.
///
/// Free tickets need no payment and start out `Paid`.
#[must_use]
pub const fn initial_status(price: Money) -> PaymentStatus {
    if price.is_zero() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

/// Builds the payment record for a fresh registration.
///
/// Free tickets are auto-paid, so `paid_at` is stamped at creation time.
#[must_use]
pub fn new_payment(method: PaymentMethod, price: Money, now: DateTime<Utc>) -> PaymentRecord {
    let mut payment = PaymentRecord::new(method, initial_status(price));
    if payment.status == PaymentStatus::Paid {
        payment.paid_at = Some(now);
    }
    payment
}

/// Checks whether the state machine permits `from -> to`.
#[must_use]
pub const fn can_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
    matches!(
        (from, to),
        (PaymentStatus::Pending, PaymentStatus::Paid)
            | (PaymentStatus::Pending | PaymentStatus::Paid, PaymentStatus::Refunded)
    )
}

/// Applies a payment-status transition, stamping `paid_at` on entry into
/// `Paid` and merging confirmation metadata.
///
/// Metadata fields absent from `update` never disturb stored values.
///
/// # Errors
///
/// Returns [`Error::InvalidTransition`] when the state machine forbids the
/// move; the record is left unchanged in that case.
pub fn apply_transition(
    payment: &mut PaymentRecord,
    to: PaymentStatus,
    update: &PaymentUpdate,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if !can_transition(payment.status, to) {
        return Err(Error::InvalidTransition {
            from: payment.status,
            to,
        });
    }

    payment.status = to;
    if to == PaymentStatus::Paid {
        payment.paid_at = Some(now);
    }

    if let Some(transaction_id) = &update.transaction_id {
        payment.transaction_id = Some(transaction_id.clone());
    }
    if let Some(payment_reference) = &update.payment_reference {
        payment.payment_reference = Some(payment_reference.clone());
    }

    Ok(())
}
