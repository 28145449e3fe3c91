//! Request extractors.
//!
//! Identity is supplied by the fronting identity service as trusted gateway
//! headers; this extractor only decodes them. Requests without a complete,
//! well-formed identity are rejected with 401 before any handler runs.

use crate::api::error::AppError;
use crate::types::{Identity, Role, UserId};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated user's id (UUID).
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's display name.
pub const USER_NAME_HEADER: &str = "x-user-name";
/// Header carrying the authenticated user's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Header carrying the authenticated user's role (`user`/`organizer`/`admin`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated caller, decoded from gateway headers.
#[derive(Clone, Debug)]
pub struct CallerIdentity(pub Identity);

fn required_header<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::unauthorized(format!("missing {name} header")))
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = required_header(parts, USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::unauthorized(format!("malformed {USER_ID_HEADER} header")))?;
        let role = required_header(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|()| {
                AppError::unauthorized(format!("unknown role in {USER_ROLE_HEADER} header"))
            })?;
        let name = required_header(parts, USER_NAME_HEADER)?.to_string();
        let email = required_header(parts, USER_EMAIL_HEADER)?.to_string();

        Ok(Self(Identity {
            user_id: UserId::from_uuid(user_id),
            name,
            email,
            role,
        }))
    }
}
