//! Persistence seam for events and registrations.
//!
//! [`TicketStore`] stands in for the external document store. Its contract is
//! what the concurrency model leans on: `commit_registration` and
//! `revoke_registration` are conditional updates that re-validate and mutate
//! in one indivisible step, so advisory checks done on earlier reads are never
//! trusted at the commit point. Implementations over a real document store map
//! these onto its atomic increment-if-below-threshold primitive; relational
//! implementations wrap the event and registration rows in one transaction
//! with row locks.
//!
//! [`InMemoryTicketStore`] is the reference implementation used by the binary
//! and the test suite.

use crate::error::Error;
use crate::types::{
    Event, EventId, EventStatus, Registration, RegistrationId, UserId,
};
use crate::{capacity, catalog};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Single-record mutation applied under the store's atomicity guarantee.
pub type UpdateFn = Box<dyn FnOnce(&mut Registration) -> Result<(), Error> + Send>;

/// Storage abstraction over events and registrations.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persists a freshly published event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if an event with the same id
    /// already exists, or [`Error::Storage`] on storage faults.
    async fn insert_event(&self, event: Event) -> Result<(), Error>;

    /// Loads an event snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on storage faults.
    async fn event(&self, id: EventId) -> Result<Option<Event>, Error>;

    /// Replaces an event's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the event does not exist, or
    /// [`Error::Storage`] on storage faults.
    async fn update_event_status(&self, id: EventId, status: EventStatus)
    -> Result<Event, Error>;

    /// Loads a registration by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on storage faults.
    async fn registration(&self, id: RegistrationId) -> Result<Option<Registration>, Error>;

    /// Loads the registration held by `user_id` for `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on storage faults.
    async fn registration_for(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Registration>, Error>;

    /// Loads every registration for an event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on storage faults.
    async fn registrations_for_event(&self, event_id: EventId)
    -> Result<Vec<Registration>, Error>;

    /// Atomically reserves one tier unit plus one capacity unit and persists
    /// the registration.
    ///
    /// Re-validates everything the increment's own condition must cover:
    /// event existence, `Active` status, (event, user) uniqueness,
    /// `sold < available` on the tier, and `booked < capacity`. Either all
    /// three mutations land or none do.
    ///
    /// # Errors
    ///
    /// Returns the matching business kind ([`Error::NotFound`],
    /// [`Error::EventNotActive`], [`Error::AlreadyRegistered`],
    /// [`Error::InvalidTicketType`], [`Error::SoldOut`], [`Error::EventFull`])
    /// when a re-validated condition fails, or [`Error::Storage`] on storage
    /// faults.
    async fn commit_registration(&self, registration: Registration)
    -> Result<Registration, Error>;

    /// Atomically deletes a registration and releases its tier unit and
    /// capacity unit.
    ///
    /// Returns the removed registration; a second call for the same id fails
    /// with [`Error::NotFound`], so a cancellation can never be applied twice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the registration does not exist,
    /// [`Error::InvariantViolation`] if its event or tier has vanished, or
    /// [`Error::Storage`] on storage faults.
    async fn revoke_registration(&self, id: RegistrationId) -> Result<Registration, Error>;

    /// Applies a single-record mutation to a registration under the store's
    /// atomicity guarantee, returning the updated record.
    ///
    /// If `mutate` fails the stored record is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the registration does not exist,
    /// whatever `mutate` returns, or [`Error::Storage`] on storage faults.
    async fn update_registration(
        &self,
        id: RegistrationId,
        mutate: UpdateFn,
    ) -> Result<Registration, Error>;
}

#[derive(Default)]
struct Inner {
    events: HashMap<EventId, Event>,
    registrations: HashMap<RegistrationId, Registration>,
    by_event_user: HashMap<(EventId, UserId), RegistrationId>,
}

/// In-memory reference store.
///
/// One lock guards all state, so every conditional update is trivially
/// indivisible; a production store shards this per event (requests for
/// different events share no mutable state).
#[derive(Default)]
pub struct InMemoryTicketStore {
    inner: RwLock<Inner>,
}

impl InMemoryTicketStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn insert_event(&self, event: Event) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        if inner.events.contains_key(&event.id) {
            return Err(Error::InvariantViolation(format!(
                "duplicate event id {}",
                event.id
            )));
        }
        inner.events.insert(event.id, event);
        Ok(())
    }

    async fn event(&self, id: EventId) -> Result<Option<Event>, Error> {
        let inner = self.inner.read().await;
        Ok(inner.events.get(&id).cloned())
    }

    async fn update_event_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> Result<Event, Error> {
        let mut inner = self.inner.write().await;
        let event = inner.events.get_mut(&id).ok_or(Error::NotFound("event"))?;
        event.status = status;
        Ok(event.clone())
    }

    async fn registration(&self, id: RegistrationId) -> Result<Option<Registration>, Error> {
        let inner = self.inner.read().await;
        Ok(inner.registrations.get(&id).cloned())
    }

    async fn registration_for(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Registration>, Error> {
        let inner = self.inner.read().await;
        let id = inner.by_event_user.get(&(event_id, user_id));
        Ok(id.and_then(|id| inner.registrations.get(id)).cloned())
    }

    async fn registrations_for_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Registration>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrations
            .values()
            .filter(|registration| registration.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn commit_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, Error> {
        let mut inner = self.inner.write().await;

        if inner
            .by_event_user
            .contains_key(&(registration.event_id, registration.user_id))
        {
            return Err(Error::AlreadyRegistered);
        }

        let event = inner
            .events
            .get(&registration.event_id)
            .ok_or(Error::NotFound("event"))?;
        if !event.status.is_active() {
            return Err(Error::EventNotActive);
        }

        // Run both conditional increments on a scratch copy; the copy only
        // replaces the stored event once every condition has held.
        let mut updated = event.clone();
        catalog::reserve(&mut updated, &registration.ticket_type)?;
        capacity::reserve(&mut updated)?;

        inner.events.insert(updated.id, updated);
        inner.by_event_user.insert(
            (registration.event_id, registration.user_id),
            registration.id,
        );
        inner
            .registrations
            .insert(registration.id, registration.clone());

        Ok(registration)
    }

    async fn revoke_registration(&self, id: RegistrationId) -> Result<Registration, Error> {
        let mut inner = self.inner.write().await;

        let registration = inner
            .registrations
            .get(&id)
            .ok_or(Error::NotFound("registration"))?
            .clone();

        let event = inner
            .events
            .get(&registration.event_id)
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "registration {id} references missing event {}",
                    registration.event_id
                ))
            })?;

        let mut updated = event.clone();
        catalog::release(&mut updated, &registration.ticket_type)?;
        capacity::release(&mut updated);

        inner.events.insert(updated.id, updated);
        inner
            .by_event_user
            .remove(&(registration.event_id, registration.user_id));
        inner.registrations.remove(&id);

        Ok(registration)
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        mutate: UpdateFn,
    ) -> Result<Registration, Error> {
        let mut inner = self.inner.write().await;

        let registration = inner
            .registrations
            .get(&id)
            .ok_or(Error::NotFound("registration"))?;

        // Mutate a copy so a rejected transition leaves the record untouched.
        let mut updated = registration.clone();
        mutate(&mut updated)?;

        inner.registrations.insert(id, updated.clone());
        Ok(updated)
    }
}
