//! Capacity ledger: the event-level `booked` counter.
//!
//! Same discipline as the catalog: pure over an [`Event`] value, applied by
//! the store inside its critical section together with the tier increment so
//! the two counters can never diverge.

use crate::error::Error;
use crate::types::Event;

/// Reserves one capacity unit.
///
/// # Errors
///
/// Returns [`Error::EventFull`] if every unit is already booked. On error the
/// event is untouched.
pub fn reserve(event: &mut Event) -> Result<(), Error> {
    if event.is_full() {
        return Err(Error::EventFull);
    }

    event.booked += 1;
    Ok(())
}

/// Releases one capacity unit, floored at zero.
///
/// A floor hit means a caller released without a matching reserve; it is
/// logged as an invariant breach rather than surfaced to the user.
pub fn release(event: &mut Event) {
    if event.booked == 0 {
        tracing::error!(event_id = %event.id, "booked counter underflow on release");
        return;
    }

    event.booked -= 1;
}
