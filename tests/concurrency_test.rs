//! Concurrency tests for last-unit scenarios.
//!
//! These verify that under concurrent load the conditional commit admits
//! exactly as many registrations as there are units, and that registrations
//! and cancellations interleaving on the same event keep the counters
//! consistent.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)] // Test code can panic

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::future::join_all;
use std::sync::Arc;
use turnstile::environment::FixedClock;
use turnstile::store::InMemoryTicketStore;
use turnstile::{
    Capacity, Error, EventDate, EventId, Identity, Money, NewEvent, NewRegistration,
    NewTicketType, PaymentMethod, RegistrationService, Role, UserId,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).single().unwrap()
}

fn service() -> Arc<RegistrationService> {
    Arc::new(RegistrationService::new(
        Arc::new(InMemoryTicketStore::new()),
        Arc::new(FixedClock::new(fixed_now())),
    ))
}

fn attendee(index: usize) -> Identity {
    Identity {
        user_id: UserId::new(),
        name: format!("Attendee {index}"),
        email: format!("attendee{index}@example.com"),
        role: Role::User,
    }
}

async fn publish(service: &RegistrationService, capacity: u32, available: u32) -> EventId {
    let organizer = Identity {
        user_id: UserId::new(),
        name: "Olive".to_string(),
        email: "olive@example.com".to_string(),
        role: Role::Organizer,
    };
    service
        .publish_event(
            &organizer,
            NewEvent {
                name: "Rush Sale".to_string(),
                date: EventDate::new(fixed_now() + Duration::days(7)),
                capacity: Capacity::new(capacity),
                tickets: vec![NewTicketType {
                    name: "General".to_string(),
                    price: Money::from_dollars(30),
                    available,
                }],
            },
        )
        .await
        .unwrap()
        .id
}

fn request(event_id: EventId) -> NewRegistration {
    NewRegistration {
        event_id,
        ticket_type: "General".to_string(),
        payment_method: PaymentMethod::Cash,
        phone: None,
    }
}

#[tokio::test]
async fn scarce_tier_admits_exactly_the_available_units() {
    let service = service();
    // 5 units, far more contenders.
    let event_id = publish(&service, 10, 5).await;

    let attempts = 32;
    let handles: Vec<_> = (0..attempts)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let caller = attendee(i);
                service.register(&caller, request(event_id)).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let sold_out = results
        .iter()
        .filter(|result| {
            matches!(result, Err(Error::SoldOut(name)) if name == "General")
        })
        .count();

    assert_eq!(successes, 5);
    assert_eq!(sold_out, attempts - 5);

    let snapshot = service.event_snapshot(event_id).await.unwrap();
    assert_eq!(snapshot.tickets[0].sold, 5);
    assert_eq!(snapshot.tickets[0].sold, snapshot.tickets[0].available);
    assert_eq!(snapshot.booked, 5);
}

#[tokio::test]
async fn last_capacity_unit_is_never_double_sold() {
    let service = service();
    // Tier inventory exceeds event capacity, so the capacity ledger is the
    // boundary under contention.
    let event_id = publish(&service, 1, 5).await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let caller = attendee(i);
                service.register(&caller, request(event_id)).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let full = results
        .iter()
        .filter(|result| matches!(result, Err(Error::EventFull)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(full, 15);

    let snapshot = service.event_snapshot(event_id).await.unwrap();
    assert_eq!(snapshot.booked, 1);
    assert_eq!(snapshot.tickets[0].sold, 1);
}

#[tokio::test]
async fn interleaved_registrations_and_cancellations_stay_consistent() {
    let service = service();
    let event_id = publish(&service, 4, 4).await;

    // Fill the event.
    let mut holders = Vec::new();
    for i in 0..4 {
        let caller = attendee(i);
        let registration = service.register(&caller, request(event_id)).await.unwrap();
        holders.push((caller, registration));
    }

    // Four cancellations race sixteen fresh registration attempts.
    let mut handles = Vec::new();
    for (caller, registration) in holders {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.cancel(&caller, registration.id).await.map(|()| false)
        }));
    }
    for i in 100..116 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let caller = attendee(i);
            service.register(&caller, request(event_id)).await.map(|_| true)
        }));
    }

    let results = join_all(handles).await;
    let mut admitted = 0_i64;
    let mut released = 0_i64;
    for joined in results {
        match joined.unwrap() {
            Ok(true) => admitted += 1,
            Ok(false) => released += 1,
            // Losers of either race are expected.
            Err(Error::SoldOut(_) | Error::EventFull) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(released, 4);

    let snapshot = service.event_snapshot(event_id).await.unwrap();
    let survivors = 4 - released + admitted;

    // Both counters agree with each other and with the surviving records.
    assert_eq!(i64::from(snapshot.booked), survivors);
    assert_eq!(snapshot.tickets[0].sold, snapshot.booked);
    assert!(snapshot.booked <= snapshot.capacity.value());
    assert!(snapshot.tickets[0].sold <= snapshot.tickets[0].available);

    let admin = Identity {
        user_id: UserId::new(),
        name: "Root".to_string(),
        email: "root@example.com".to_string(),
        role: Role::Admin,
    };
    let analytics = service.analytics(&admin, event_id, 32).await.unwrap();
    assert_eq!(analytics.total_registrations as i64, survivors);
}
