//! Registration service: the single orchestrator of event, tier, and
//! registration state.
//!
//! All mutation flows through here. Each operation validates against a fresh
//! snapshot, then hands the store one conditional commit (or its inverse);
//! the store re-validates under its own atomicity, so a stale snapshot can
//! reject early but never over-admit.

use crate::analytics::{self, AvailabilitySummary, EventAnalytics};
use crate::catalog;
use crate::environment::Clock;
use crate::error::Error;
use crate::ledger;
use crate::store::TicketStore;
use crate::types::{
    ContactInfo, Event, EventId, EventStatus, Identity, NewEvent, NewRegistration, PaymentStatus,
    PaymentUpdate, Registration, RegistrationId, TicketType, UserId,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Backoff before the single retry of a transient storage failure. The retry
/// only ever runs before any side effect has been observed by the caller.
const COMMIT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Orchestrates registration, cancellation, payment-status transitions, and
/// the read-side queries.
pub struct RegistrationService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Creates a service over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // ========================================================================
    // Event publishing (organizer surface)
    // ========================================================================

    /// Publishes a new event with its ticket tiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] unless the caller may publish events,
    /// [`Error::InvalidEvent`] when the description fails validation, or a
    /// storage error.
    pub async fn publish_event(
        &self,
        identity: &Identity,
        draft: NewEvent,
    ) -> Result<Event, Error> {
        if !identity.role.can_publish() {
            return Err(Error::Forbidden);
        }

        Self::validate_draft(&draft)?;

        let event = Event::new(
            EventId::new(),
            identity.user_id,
            draft.name,
            draft.date,
            draft.capacity,
            draft
                .tickets
                .into_iter()
                .map(|tier| TicketType::new(tier.name, tier.price, tier.available))
                .collect(),
            self.clock.now(),
        );

        self.store.insert_event(event.clone()).await?;
        tracing::info!(event_id = %event.id, creator_id = %event.creator_id, "event published");
        Ok(event)
    }

    fn validate_draft(draft: &NewEvent) -> Result<(), Error> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidEvent("name must not be empty".to_string()));
        }
        if draft.capacity.value() == 0 {
            return Err(Error::InvalidEvent(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if draft.tickets.is_empty() {
            return Err(Error::InvalidEvent(
                "at least one ticket tier is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for tier in &draft.tickets {
            if tier.name.trim().is_empty() {
                return Err(Error::InvalidEvent(
                    "tier names must not be empty".to_string(),
                ));
            }
            if !names.insert(tier.name.as_str()) {
                return Err(Error::InvalidEvent(format!(
                    "duplicate tier name {:?}",
                    tier.name
                )));
            }
        }

        Ok(())
    }

    /// Replaces an event's lifecycle status (cancel, complete, reopen).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the event does not exist,
    /// [`Error::Forbidden`] unless the caller is the creator or an admin, or
    /// a storage error.
    pub async fn update_event_status(
        &self,
        identity: &Identity,
        event_id: EventId,
        status: EventStatus,
    ) -> Result<Event, Error> {
        let event = self
            .store
            .event(event_id)
            .await?
            .ok_or(Error::NotFound("event"))?;
        Self::require_creator_or_admin(identity, &event)?;

        let updated = self.store.update_event_status(event_id, status).await?;
        tracing::info!(event_id = %event_id, status = %status, "event status updated");
        Ok(updated)
    }

    // ========================================================================
    // Register
    // ========================================================================

    /// Registers the caller for an event at the named tier.
    ///
    /// Preconditions are checked in a fixed order, first failure wins; the
    /// store's conditional commit then re-validates the counters and
    /// uniqueness, so concurrent registrations can never pass the same
    /// capacity boundary together.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], [`Error::EventNotActive`],
    /// [`Error::EventInPast`], [`Error::AlreadyRegistered`],
    /// [`Error::InvalidTicketType`], [`Error::SoldOut`], [`Error::EventFull`],
    /// or a storage error.
    pub async fn register(
        &self,
        identity: &Identity,
        request: NewRegistration,
    ) -> Result<Registration, Error> {
        let now = self.clock.now();

        let event = self
            .store
            .event(request.event_id)
            .await?
            .ok_or(Error::NotFound("event"))?;

        if !event.status.is_active() {
            return Err(Error::EventNotActive);
        }
        if event.date.has_passed(now) {
            return Err(Error::EventInPast);
        }
        if self
            .store
            .registration_for(event.id, identity.user_id)
            .await?
            .is_some()
        {
            return Err(Error::AlreadyRegistered);
        }

        let tier = catalog::find_tier(&event, &request.ticket_type)
            .ok_or_else(|| Error::InvalidTicketType(request.ticket_type.clone()))?;
        if tier.is_sold_out() {
            return Err(Error::SoldOut(tier.name.clone()));
        }
        if event.is_full() {
            return Err(Error::EventFull);
        }

        let registration = Registration {
            id: RegistrationId::new(),
            event_id: event.id,
            user_id: identity.user_id,
            ticket_type: tier.name.clone(),
            ticket_price: tier.price,
            contact: ContactInfo {
                name: identity.name.clone(),
                email: identity.email.clone(),
                phone: request.phone,
            },
            payment: ledger::new_payment(request.payment_method, tier.price, now),
            created_at: now,
        };

        let committed = match self.store.commit_registration(registration.clone()).await {
            Err(err) if err.is_transient() => {
                tracing::warn!(error = %err, "transient storage failure on commit, retrying once");
                tokio::time::sleep(COMMIT_RETRY_BACKOFF).await;
                self.store.commit_registration(registration).await?
            }
            other => other?,
        };

        tracing::info!(
            registration_id = %committed.id,
            event_id = %committed.event_id,
            user_id = %committed.user_id,
            tier = %committed.ticket_type,
            status = %committed.payment.status,
            "registration committed"
        );
        Ok(committed)
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Cancels a registration, releasing its tier unit and capacity unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the registration does not exist (a
    /// second cancel of the same id always lands here), [`Error::Forbidden`]
    /// unless the caller owns the registration or is an admin,
    /// [`Error::EventInPast`] when the event already took place, or a storage
    /// error.
    pub async fn cancel(
        &self,
        identity: &Identity,
        registration_id: RegistrationId,
    ) -> Result<(), Error> {
        let registration = self
            .store
            .registration(registration_id)
            .await?
            .ok_or(Error::NotFound("registration"))?;

        if registration.user_id != identity.user_id && !identity.role.is_admin() {
            return Err(Error::Forbidden);
        }

        let event = self
            .store
            .event(registration.event_id)
            .await?
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "registration {registration_id} references missing event {}",
                    registration.event_id
                ))
            })?;

        // Attendance for a past event stays on record for reporting.
        if event.date.has_passed(self.clock.now()) {
            return Err(Error::EventInPast);
        }

        let revoked = match self.store.revoke_registration(registration_id).await {
            Err(err) if err.is_transient() => {
                tracing::warn!(error = %err, "transient storage failure on revoke, retrying once");
                tokio::time::sleep(COMMIT_RETRY_BACKOFF).await;
                self.store.revoke_registration(registration_id).await?
            }
            other => other?,
        };

        tracing::info!(
            registration_id = %revoked.id,
            event_id = %revoked.event_id,
            user_id = %revoked.user_id,
            tier = %revoked.ticket_type,
            "registration cancelled"
        );
        Ok(())
    }

    // ========================================================================
    // Payment status
    // ========================================================================

    /// Moves a registration's payment status through the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the registration does not exist,
    /// [`Error::Forbidden`] unless the caller is the event's creator or an
    /// admin, [`Error::InvalidTransition`] when the state machine forbids the
    /// move, or a storage error.
    pub async fn update_payment_status(
        &self,
        identity: &Identity,
        registration_id: RegistrationId,
        new_status: PaymentStatus,
        update: PaymentUpdate,
    ) -> Result<Registration, Error> {
        let registration = self
            .store
            .registration(registration_id)
            .await?
            .ok_or(Error::NotFound("registration"))?;

        let event = self
            .store
            .event(registration.event_id)
            .await?
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "registration {registration_id} references missing event {}",
                    registration.event_id
                ))
            })?;
        Self::require_creator_or_admin(identity, &event)?;

        let now = self.clock.now();
        let updated = self
            .store
            .update_registration(
                registration_id,
                Box::new(move |record| {
                    ledger::apply_transition(&mut record.payment, new_status, &update, now)
                }),
            )
            .await?;

        tracing::info!(
            registration_id = %updated.id,
            status = %updated.payment.status,
            "payment status updated"
        );
        Ok(updated)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Looks up the caller's registration for an event, if any. Pure read.
    ///
    /// # Errors
    ///
    /// Returns a storage error only.
    pub async fn check_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Registration>, Error> {
        self.store.registration_for(event_id, user_id).await
    }

    /// Loads an event snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the event does not exist, or a storage
    /// error.
    pub async fn event_snapshot(&self, event_id: EventId) -> Result<Event, Error> {
        self.store
            .event(event_id)
            .await?
            .ok_or(Error::NotFound("event"))
    }

    /// Builds the tier availability summary for an event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the event does not exist, or a storage
    /// error.
    pub async fn availability(&self, event_id: EventId) -> Result<AvailabilitySummary, Error> {
        let event = self.event_snapshot(event_id).await?;
        Ok(analytics::availability(&event))
    }

    /// Projects registration analytics for an event, restricted to the
    /// event's creator or an admin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the event does not exist,
    /// [`Error::Forbidden`] for other callers, or a storage error.
    pub async fn analytics(
        &self,
        identity: &Identity,
        event_id: EventId,
        recent_limit: usize,
    ) -> Result<EventAnalytics, Error> {
        let event = self.event_snapshot(event_id).await?;
        Self::require_creator_or_admin(identity, &event)?;

        let registrations = self.store.registrations_for_event(event_id).await?;
        Ok(analytics::project(&registrations, recent_limit))
    }

    fn require_creator_or_admin(identity: &Identity, event: &Event) -> Result<(), Error> {
        if event.creator_id == identity.user_id || identity.role.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::environment::FixedClock;
    use crate::store::InMemoryTicketStore;
    use crate::types::{Capacity, EventDate, Money, NewTicketType, PaymentMethod, Role};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().unwrap()
    }

    fn service() -> RegistrationService {
        RegistrationService::new(
            Arc::new(InMemoryTicketStore::new()),
            Arc::new(FixedClock::new(fixed_now())),
        )
    }

    fn organizer() -> Identity {
        Identity {
            user_id: UserId::new(),
            name: "Olive Organizer".to_string(),
            email: "olive@example.com".to_string(),
            role: Role::Organizer,
        }
    }

    fn attendee(name: &str) -> Identity {
        Identity {
            user_id: UserId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::User,
        }
    }

    fn draft(capacity: u32, tier_available: u32, price: Money) -> NewEvent {
        NewEvent {
            name: "Summer Gala".to_string(),
            date: EventDate::new(fixed_now() + ChronoDuration::days(14)),
            capacity: Capacity::new(capacity),
            tickets: vec![NewTicketType {
                name: "General".to_string(),
                price,
                available: tier_available,
            }],
        }
    }

    fn cash_request(event_id: EventId) -> NewRegistration {
        NewRegistration {
            event_id,
            ticket_type: "General".to_string(),
            payment_method: PaymentMethod::Cash,
            phone: None,
        }
    }

    #[tokio::test]
    async fn attendees_cannot_publish_events() {
        let service = service();

        let err = service
            .publish_event(&attendee("Eve"), draft(10, 10, Money::ZERO))
            .await
            .unwrap_err();

        assert_eq!(err, Error::Forbidden);
    }

    #[tokio::test]
    async fn duplicate_tier_names_are_rejected() {
        let service = service();
        let mut event_draft = draft(10, 5, Money::ZERO);
        event_draft.tickets.push(NewTicketType {
            name: "General".to_string(),
            price: Money::from_dollars(99),
            available: 5,
        });

        let err = service
            .publish_event(&organizer(), event_draft)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[tokio::test]
    async fn inactive_event_rejects_before_date_check() {
        let service = service();
        let organizer = organizer();
        // Cancelled AND in the past: status must win, per the check order.
        let mut event_draft = draft(10, 10, Money::ZERO);
        event_draft.date = EventDate::new(fixed_now() - ChronoDuration::days(1));
        let event = service
            .publish_event(&organizer, event_draft)
            .await
            .unwrap();
        service
            .update_event_status(&organizer, event.id, EventStatus::Cancelled)
            .await
            .unwrap();

        let err = service
            .register(&attendee("Amy"), cash_request(event.id))
            .await
            .unwrap_err();

        assert_eq!(err, Error::EventNotActive);
    }

    #[tokio::test]
    async fn sold_out_tier_reports_before_event_full() {
        let service = service();
        let organizer = organizer();
        // Tier inventory is exhausted while capacity still has room.
        let event = service
            .publish_event(
                &organizer,
                NewEvent {
                    name: "Workshop".to_string(),
                    date: EventDate::new(fixed_now() + ChronoDuration::days(7)),
                    capacity: Capacity::new(10),
                    tickets: vec![
                        NewTicketType {
                            name: "General".to_string(),
                            price: Money::ZERO,
                            available: 1,
                        },
                        NewTicketType {
                            name: "VIP".to_string(),
                            price: Money::from_dollars(100),
                            available: 9,
                        },
                    ],
                },
            )
            .await
            .unwrap();
        service
            .register(&attendee("Amy"), cash_request(event.id))
            .await
            .unwrap();

        let err = service
            .register(&attendee("Bob"), cash_request(event.id))
            .await
            .unwrap_err();

        assert_eq!(err, Error::SoldOut("General".to_string()));
    }

    #[tokio::test]
    async fn only_creator_or_admin_reads_analytics() {
        let service = service();
        let organizer = organizer();
        let event = service
            .publish_event(&organizer, draft(10, 10, Money::ZERO))
            .await
            .unwrap();

        let err = service
            .analytics(&attendee("Eve"), event.id, 10)
            .await
            .unwrap_err();
        assert_eq!(err, Error::Forbidden);

        let admin = Identity {
            role: Role::Admin,
            ..attendee("Root")
        };
        assert!(service.analytics(&admin, event.id, 10).await.is_ok());
    }
}
