//! Ticket catalog: tier lookup and the conditional ±1 on a tier's `sold`
//! counter.
//!
//! These functions are pure over an [`Event`] value. The store applies them
//! inside its critical section so that the check and the increment land as one
//! indivisible step against the backing record; callers outside that section
//! may only use them for advisory validation on a snapshot.

use crate::error::Error;
use crate::types::{Event, Money, TicketType};

/// Looks up a tier by name.
#[must_use]
pub fn find_tier<'a>(event: &'a Event, name: &str) -> Option<&'a TicketType> {
    event.tickets.iter().find(|tier| tier.name == name)
}

/// Reserves one unit of the named tier, returning the tier's current price
/// (the source of the registration's price snapshot).
///
/// # Errors
///
/// Returns [`Error::InvalidTicketType`] if no tier carries `name`, or
/// [`Error::SoldOut`] if the tier has no unsold unit left. On error the event
/// is untouched.
pub fn reserve(event: &mut Event, name: &str) -> Result<Money, Error> {
    let tier = event
        .tickets
        .iter_mut()
        .find(|tier| tier.name == name)
        .ok_or_else(|| Error::InvalidTicketType(name.to_string()))?;

    if tier.is_sold_out() {
        return Err(Error::SoldOut(name.to_string()));
    }

    tier.sold += 1;
    Ok(tier.price)
}

/// Releases one previously reserved unit of the named tier.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the tier is missing or its `sold`
/// counter would go negative; given correct callers neither can happen.
pub fn release(event: &mut Event, name: &str) -> Result<(), Error> {
    let event_id = event.id;
    let tier = event
        .tickets
        .iter_mut()
        .find(|tier| tier.name == name)
        .ok_or_else(|| {
            Error::InvariantViolation(format!(
                "release for unknown tier {name:?} on event {event_id}"
            ))
        })?;

    if tier.sold == 0 {
        return Err(Error::InvariantViolation(format!(
            "sold counter underflow for tier {name:?} on event {event_id}"
        )));
    }

    tier.sold -= 1;
    Ok(())
}
