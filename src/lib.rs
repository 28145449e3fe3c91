//! Turnstile - event ticket-inventory and registration consistency core.
//!
//! Organizers publish events with multiple ticket tiers; attendees register
//! and pay; the core keeps three redundant counters (event capacity, event
//! `booked` total, per-tier `sold` count) mutually consistent across
//! registration and cancellation, and projects read-side analytics.
//!
//! # Architecture
//!
//! ```text
//!                 ┌────────────────────┐
//!                 │   HTTP (axum)      │  identity via gateway headers
//!                 └─────────┬──────────┘
//!                           │
//!                 ┌─────────▼──────────┐
//!                 │ RegistrationService │  validation order, authz, retry
//!                 └─────────┬──────────┘
//!            ┌──────────────┼───────────────┐
//!    ┌───────▼─────┐ ┌──────▼──────┐ ┌──────▼───────┐
//!    │   catalog   │ │  capacity   │ │    ledger    │
//!    │ (tier sold) │ │  (booked)   │ │ (pay status) │
//!    └───────┬─────┘ └──────┬──────┘ └──────┬───────┘
//!            └──────────────┼───────────────┘
//!                 ┌─────────▼──────────┐
//!                 │    TicketStore     │  conditional atomic commit
//!                 └────────────────────┘
//! ```
//!
//! # Consistency model
//!
//! The service validates against a snapshot (first failure wins, in a fixed
//! order), then hands the store one conditional commit. The commit re-checks
//! uniqueness and both counters inside its critical section, so concurrent
//! registrations can never pass the same capacity boundary together, and a
//! cancellation releases exactly what its registration reserved. Partial
//! application is never observable.
//!
//! The read side ([`analytics`]) only ever aggregates snapshots.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod api;
pub mod capacity;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod error;
pub mod ledger;
pub mod service;
pub mod store;
pub mod types;

pub use analytics::{AvailabilitySummary, EventAnalytics};
pub use config::Config;
pub use environment::{Clock, FixedClock, SystemClock};
pub use error::Error;
pub use service::RegistrationService;
pub use store::{InMemoryTicketStore, TicketStore};
pub use types::*;
