//! Business-error taxonomy for the registration core.
//!
//! Every expected business condition is returned as a typed value; nothing in
//! this crate uses panics for control flow. Only [`Error::InvariantViolation`]
//! and [`Error::Storage`] are unexpected and alert-worthy.

use crate::types::PaymentStatus;
use thiserror::Error;

/// Errors produced by the registration core.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The event is cancelled or completed and cannot accept registrations.
    #[error("event is not open for registration")]
    EventNotActive,

    /// The event date is no longer in the future.
    #[error("event date has already passed")]
    EventInPast,

    /// The user already holds a registration for this event.
    #[error("user is already registered for this event")]
    AlreadyRegistered,

    /// No tier with the requested name exists on the event.
    #[error("unknown ticket type {0:?}")]
    InvalidTicketType(String),

    /// Every unit of the requested tier has been sold.
    #[error("ticket type {0:?} is sold out")]
    SoldOut(String),

    /// Every capacity unit of the event has been reserved.
    #[error("event is at full capacity")]
    EventFull,

    /// The caller is not allowed to perform this operation.
    #[error("caller is not allowed to perform this operation")]
    Forbidden,

    /// The requested payment-status transition is not allowed.
    #[error("invalid payment status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the registration is currently in
        from: PaymentStatus,
        /// Status that was requested
        to: PaymentStatus,
    },

    /// An event description failed validation at publish time.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// A counter invariant was breached; indicates a bug upstream, never a
    /// user-facing condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl Error {
    /// Stable machine-readable code for the HTTP boundary.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::EventNotActive => "EVENT_NOT_ACTIVE",
            Self::EventInPast => "EVENT_IN_PAST",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::InvalidTicketType(_) => "INVALID_TICKET_TYPE",
            Self::SoldOut(_) => "SOLD_OUT",
            Self::EventFull => "EVENT_FULL",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidEvent(_) => "INVALID_EVENT",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Checks whether this error warrants alerting rather than a user-facing
    /// rejection.
    #[must_use]
    pub const fn is_alert(&self) -> bool {
        matches!(self, Self::InvariantViolation(_) | Self::Storage(_))
    }

    /// Checks whether the operation may be retried safely once no side effect
    /// has been observed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::EventFull.code(), "EVENT_FULL");
        assert_eq!(Error::SoldOut("VIP".to_string()).code(), "SOLD_OUT");
        assert_eq!(
            Error::InvalidTransition {
                from: PaymentStatus::Refunded,
                to: PaymentStatus::Paid,
            }
            .code(),
            "INVALID_TRANSITION"
        );
    }

    #[test]
    fn only_infrastructure_errors_alert() {
        assert!(Error::Storage("down".to_string()).is_alert());
        assert!(Error::InvariantViolation("sold underflow".to_string()).is_alert());
        assert!(!Error::EventFull.is_alert());
        assert!(!Error::Forbidden.is_alert());
    }

    #[test]
    fn display_carries_context() {
        let err = Error::InvalidTicketType("Balcony".to_string());
        assert_eq!(err.to_string(), "unknown ticket type \"Balcony\"");
    }
}
