//! HTTP round-trip tests against a server on an ephemeral port.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use turnstile::api::{AppState, build_router};
use turnstile::environment::SystemClock;
use turnstile::store::InMemoryTicketStore;
use turnstile::RegistrationService;
use uuid::Uuid;

async fn spawn_server() -> SocketAddr {
    let service = Arc::new(RegistrationService::new(
        Arc::new(InMemoryTicketStore::new()),
        Arc::new(SystemClock),
    ));
    let router = build_router(AppState::new(service, 10));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

struct Caller {
    id: Uuid,
    name: &'static str,
    role: &'static str,
}

impl Caller {
    fn new(name: &'static str, role: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
        }
    }
}

fn with_identity(request: reqwest::RequestBuilder, caller: &Caller) -> reqwest::RequestBuilder {
    request
        .header("x-user-id", caller.id.to_string())
        .header("x-user-name", caller.name)
        .header("x-user-email", format!("{}@example.com", caller.name))
        .header("x-user-role", caller.role)
}

fn event_body(capacity: u32, price_cents: u64, available: u32) -> Value {
    json!({
        "name": "API Launch Night",
        "date": "2030-01-01T19:00:00Z",
        "capacity": capacity,
        "tickets": [
            { "name": "General", "price": price_cents, "available": available }
        ]
    })
}

async fn create_event(base: &str, organizer: &Caller, body: Value) -> Value {
    let client = reqwest::Client::new();
    let response = with_identity(client.post(format!("{base}/api/events")), organizer)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/registrations"))
        .json(&json!({
            "event_id": Uuid::new_v4(),
            "ticket_type": "General",
            "payment_method": { "type": "cash" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_event_returns_404_with_stable_code() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/api/events/{}", Uuid::new_v4()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn full_registration_round_trip() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let organizer = Caller::new("Olive", "organizer");
    let attendee = Caller::new("Alice", "user");

    let event = create_event(&base, &organizer, event_body(5, 5000, 5)).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    // Register with a bank transfer.
    let response = with_identity(client.post(format!("{base}/api/registrations")), &attendee)
        .json(&json!({
            "event_id": event_id,
            "ticket_type": "General",
            "payment_method": {
                "type": "bank_transfer",
                "bank_name": "First National",
                "account_number": "12345678"
            },
            "phone": "555-0100"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registration: Value = response.json().await.unwrap();
    assert_eq!(registration["payment"]["status"], "pending");
    assert_eq!(registration["ticket_price"], 5000);
    let registration_id = registration["id"].as_str().unwrap().to_string();

    // Registering again conflicts.
    let response = with_identity(client.post(format!("{base}/api/registrations")), &attendee)
        .json(&json!({
            "event_id": event_id,
            "ticket_type": "General",
            "payment_method": { "type": "cash" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_REGISTERED");

    // The check endpoint sees the registration.
    let response = with_identity(
        client.get(format!("{base}/api/registrations/check/{event_id}")),
        &attendee,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["registered"], true);

    // Availability reflects the reserved unit.
    let response = client
        .get(format!("{base}/api/events/{event_id}/availability"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["booked"], 1);
    assert_eq!(body["tiers"][0]["sold"], 1);
    assert_eq!(body["tiers"][0]["remaining"], 4);

    // Organizer confirms the payment with metadata.
    let response = with_identity(
        client.put(format!(
            "{base}/api/registrations/{registration_id}/payment-status"
        )),
        &organizer,
    )
    .json(&json!({ "payment_status": "paid", "transaction_id": "TX1" }))
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payment"]["status"], "paid");
    assert_eq!(body["payment"]["transaction_id"], "TX1");
    assert!(!body["payment"]["paid_at"].is_null());

    // Analytics is creator-only.
    let response = with_identity(
        client.get(format!("{base}/api/events/{event_id}/analytics")),
        &attendee,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = with_identity(
        client.get(format!("{base}/api/events/{event_id}/analytics")),
        &organizer,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_registrations"], 1);
    assert_eq!(body["revenue"], 5000);

    // Cancel once, then the id is gone.
    let response = with_identity(
        client.delete(format!("{base}/api/registrations/{registration_id}")),
        &attendee,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = with_identity(
        client.delete(format!("{base}/api/registrations/{registration_id}")),
        &attendee,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sold_out_tier_maps_to_conflict() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let organizer = Caller::new("Olive", "organizer");
    let event = create_event(&base, &organizer, event_body(5, 0, 1)).await;
    let event_id = event["id"].as_str().unwrap();

    let first = Caller::new("Alice", "user");
    let response = with_identity(client.post(format!("{base}/api/registrations")), &first)
        .json(&json!({
            "event_id": event_id,
            "ticket_type": "General",
            "payment_method": { "type": "cash" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    // Free tickets come back already paid.
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payment"]["status"], "paid");

    let second = Caller::new("Bob", "user");
    let response = with_identity(client.post(format!("{base}/api/registrations")), &second)
        .json(&json!({
            "event_id": event_id,
            "ticket_type": "General",
            "payment_method": { "type": "cash" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "SOLD_OUT");
}

#[tokio::test]
async fn attendees_cannot_publish_events() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let attendee = Caller::new("Alice", "user");
    let response = with_identity(client.post(format!("{base}/api/events")), &attendee)
        .json(&event_body(5, 0, 5))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "FORBIDDEN");
}
