//! HTTP boundary: router, shared state, and handlers.
//!
//! Handlers stay thin: decode the caller's identity and the request body,
//! call the registration service, and map domain errors to status codes via
//! [`error::AppError`]. Nothing below this module knows about HTTP.

pub mod error;
pub mod events;
pub mod extract;
pub mod registrations;

use crate::service::RegistrationService;
use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

/// Shared state available to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The registration service
    pub service: Arc<RegistrationService>,
    /// Default number of most-recent registrations in analytics payloads
    pub recent_limit: usize,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub const fn new(service: Arc<RegistrationService>, recent_limit: usize) -> Self {
        Self {
            service,
            recent_limit,
        }
    }
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events", post(events::create_event))
        .route("/api/events/:id", get(events::get_event))
        .route("/api/events/:id/status", put(events::update_event_status))
        .route("/api/events/:id/availability", get(events::get_availability))
        .route("/api/events/:id/analytics", get(events::get_analytics))
        .route("/api/registrations", post(registrations::register))
        .route("/api/registrations/:id", delete(registrations::cancel))
        .route(
            "/api/registrations/:id/payment-status",
            put(registrations::update_payment_status),
        )
        .route(
            "/api/registrations/check/:event_id",
            get(registrations::check_registration),
        )
        .with_state(state)
}
