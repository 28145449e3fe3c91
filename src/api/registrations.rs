//! Registration API endpoints.
//!
//! - `POST /api/registrations` - Register for an event
//! - `DELETE /api/registrations/:id` - Cancel a registration
//! - `PUT /api/registrations/:id/payment-status` - Update payment status
//! - `GET /api/registrations/check/:event_id` - Check own registration

use crate::api::error::AppError;
use crate::api::extract::CallerIdentity;
use crate::api::AppState;
use crate::types::{
    EventId, NewRegistration, PaymentStatus, PaymentUpdate, Registration, RegistrationId,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to update a registration's payment status.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    /// Requested status
    pub payment_status: PaymentStatus,
    /// External transaction identifier, if reported
    pub transaction_id: Option<String>,
    /// Free-form payment reference, if reported
    pub payment_reference: Option<String>,
}

/// Response after cancelling a registration.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    /// Cancelled registration id
    pub registration_id: Uuid,
    /// Message for the user
    pub message: String,
}

/// Response for the registration check endpoint.
#[derive(Debug, Serialize)]
pub struct CheckRegistrationResponse {
    /// Whether the caller holds a registration for the event
    pub registered: bool,
    /// The registration, when one exists
    pub registration: Option<Registration>,
}

/// Register the caller for an event.
///
/// The identity collaborator supplies the caller's id, name, and email; the
/// body carries the event, tier, payment method, and optional phone number.
///
/// # Errors
///
/// `404` for an unknown event, `400` for inactive/past events and unknown
/// tiers, `409` when already registered, sold out, or at capacity.
pub async fn register(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Json(request): Json<NewRegistration>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let registration = state.service.register(&caller.0, request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Cancel a registration.
///
/// Allowed for the registration's owner or an admin, only while the event is
/// still in the future.
///
/// # Errors
///
/// `404` when the registration does not exist (including a repeated cancel),
/// `403` for other callers, `400` once the event has passed.
pub async fn cancel(
    caller: CallerIdentity,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CancelResponse>, AppError> {
    state
        .service
        .cancel(&caller.0, RegistrationId::from_uuid(registration_id))
        .await?;
    Ok(Json(CancelResponse {
        registration_id,
        message: "registration cancelled".to_string(),
    }))
}

/// Update a registration's payment status.
///
/// Restricted to the event's creator or an admin; transitions follow the
/// payment state machine and invalid moves leave the record unchanged.
///
/// # Errors
///
/// `404` when the registration does not exist, `403` for other callers,
/// `400` for invalid transitions.
pub async fn update_payment_status(
    caller: CallerIdentity,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Registration>, AppError> {
    let update = PaymentUpdate {
        transaction_id: request.transaction_id,
        payment_reference: request.payment_reference,
    };
    let registration = state
        .service
        .update_payment_status(
            &caller.0,
            RegistrationId::from_uuid(registration_id),
            request.payment_status,
            update,
        )
        .await?;
    Ok(Json(registration))
}

/// Check whether the caller is registered for an event.
///
/// Pure read; never mutates state.
///
/// # Errors
///
/// `503` on storage faults only.
pub async fn check_registration(
    caller: CallerIdentity,
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CheckRegistrationResponse>, AppError> {
    let registration = state
        .service
        .check_registration(EventId::from_uuid(event_id), caller.0.user_id)
        .await?;
    Ok(Json(CheckRegistrationResponse {
        registered: registration.is_some(),
        registration,
    }))
}
