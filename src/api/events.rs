//! Event management API endpoints.
//!
//! - `POST /api/events` - Publish an event with its ticket tiers (organizer)
//! - `GET /api/events/:id` - Event snapshot
//! - `PUT /api/events/:id/status` - Update lifecycle status (creator/admin)
//! - `GET /api/events/:id/availability` - Per-tier availability summary
//! - `GET /api/events/:id/analytics` - Registration analytics (creator/admin)

use crate::analytics::{AvailabilitySummary, EventAnalytics};
use crate::api::error::AppError;
use crate::api::extract::CallerIdentity;
use crate::api::AppState;
use crate::types::{Event, EventId, EventStatus, NewEvent};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

/// Upper bound on the `limit` query parameter of the analytics endpoint.
const MAX_RECENT_LIMIT: usize = 100;

/// Request to update an event's lifecycle status.
#[derive(Debug, Deserialize)]
pub struct UpdateEventStatusRequest {
    /// New status for the event
    pub status: EventStatus,
}

/// Query parameters for the analytics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// How many most-recent registrations to include
    pub limit: Option<usize>,
}

/// Publish a new event.
///
/// Requires an organizer or admin identity.
///
/// # Errors
///
/// `403` for attendees, `400` for invalid drafts.
pub async fn create_event(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Json(draft): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.service.publish_event(&caller.0, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get an event snapshot by id.
///
/// # Errors
///
/// `404` when the event does not exist.
pub async fn get_event(
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .service
        .event_snapshot(EventId::from_uuid(event_id))
        .await?;
    Ok(Json(event))
}

/// Update an event's lifecycle status.
///
/// # Errors
///
/// `404` when the event does not exist, `403` unless the caller is the
/// creator or an admin.
pub async fn update_event_status(
    caller: CallerIdentity,
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateEventStatusRequest>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .service
        .update_event_status(&caller.0, EventId::from_uuid(event_id), request.status)
        .await?;
    Ok(Json(event))
}

/// Get the per-tier availability summary for an event.
///
/// Public endpoint used to render tier pickers.
///
/// # Errors
///
/// `404` when the event does not exist.
pub async fn get_availability(
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilitySummary>, AppError> {
    let summary = state
        .service
        .availability(EventId::from_uuid(event_id))
        .await?;
    Ok(Json(summary))
}

/// Get registration analytics for an event.
///
/// Restricted to the event's creator or an admin.
///
/// # Errors
///
/// `404` when the event does not exist, `403` for other callers.
pub async fn get_analytics(
    caller: CallerIdentity,
    Path(event_id): Path<Uuid>,
    Query(query): Query<AnalyticsQuery>,
    State(state): State<AppState>,
) -> Result<Json<EventAnalytics>, AppError> {
    let limit = query
        .limit
        .unwrap_or(state.recent_limit)
        .min(MAX_RECENT_LIMIT);
    let analytics = state
        .service
        .analytics(&caller.0, EventId::from_uuid(event_id), limit)
        .await?;
    Ok(Json(analytics))
}
