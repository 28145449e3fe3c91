//! Read-side projections: per-event registration analytics and the tier
//! availability summary.
//!
//! Everything here is pure aggregation over snapshots, recomputed per request.
//! Nothing in this module mutates state, and an event with zero registrations
//! projects to zeroed/empty structures rather than an error.

use crate::types::{Event, EventId, Money, PaymentStatus, Registration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of most-recent registrations carried by the analytics
/// payload.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Aggregated registration metrics for one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAnalytics {
    /// Total number of registrations on record
    pub total_registrations: usize,
    /// Sum of ticket prices across paid registrations
    pub revenue: Money,
    /// Registration counts grouped by payment status
    pub by_payment_status: BTreeMap<String, u32>,
    /// Registration counts grouped by tier name
    pub by_ticket_type: BTreeMap<String, u32>,
    /// Registration counts grouped by payment method
    pub by_payment_method: BTreeMap<String, u32>,
    /// Most recent registrations, newest first
    pub recent: Vec<Registration>,
}

/// Projects the analytics payload for one event's registrations.
#[must_use]
pub fn project(registrations: &[Registration], recent_limit: usize) -> EventAnalytics {
    let mut revenue = Money::ZERO;
    let mut by_payment_status = BTreeMap::new();
    let mut by_ticket_type = BTreeMap::new();
    let mut by_payment_method = BTreeMap::new();

    for registration in registrations {
        if registration.payment.status == PaymentStatus::Paid {
            revenue = revenue.saturating_add(registration.ticket_price);
        }

        *by_payment_status
            .entry(registration.payment.status.label().to_string())
            .or_insert(0) += 1;
        *by_ticket_type
            .entry(registration.ticket_type.clone())
            .or_insert(0) += 1;
        *by_payment_method
            .entry(registration.payment.method.label().to_string())
            .or_insert(0) += 1;
    }

    let mut recent: Vec<Registration> = registrations.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(recent_limit);

    EventAnalytics {
        total_registrations: registrations.len(),
        revenue,
        by_payment_status,
        by_ticket_type,
        by_payment_method,
        recent,
    }
}

/// Availability of one tier, as rendered to tier pickers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAvailability {
    /// Tier name
    pub name: String,
    /// Price per unit
    pub price: Money,
    /// Total inventory
    pub available: u32,
    /// Units reserved so far
    pub sold: u32,
    /// Units still unsold
    pub remaining: u32,
}

/// Event-level availability summary across all tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    /// Event identifier
    pub event_id: EventId,
    /// Total admission capacity
    pub capacity: u32,
    /// Capacity units reserved so far
    pub booked: u32,
    /// Capacity units still free
    pub remaining: u32,
    /// Per-tier availability, in catalog order
    pub tiers: Vec<TierAvailability>,
}

/// Builds the availability summary from an event snapshot.
#[must_use]
pub fn availability(event: &Event) -> AvailabilitySummary {
    AvailabilitySummary {
        event_id: event.id,
        capacity: event.capacity.value(),
        booked: event.booked,
        remaining: event.remaining(),
        tiers: event
            .tickets
            .iter()
            .map(|tier| TierAvailability {
                name: tier.name.clone(),
                price: tier.price,
                available: tier.available,
                sold: tier.sold,
                remaining: tier.remaining(),
            })
            .collect(),
    }
}
