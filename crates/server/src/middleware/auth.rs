//! Authentication extractors for the two session scopes.
//!
//! The portal has two independent session scopes carried in the same
//! cookie-backed session: a customer scope (`user_id`) and an admin scope
//! (`admin_id`). Logging in as one never grants the other.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use oroshi_core::{AdminId, UserId};

use crate::error::AppError;

/// Session key names for the two scopes.
pub mod session_keys {
    /// Customer scope.
    pub const USER_ID: &str = "user_id";
    /// Admin scope.
    pub const ADMIN_ID: &str = "admin_id";
}

/// Extractor that requires a customer session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user_id): RequireUser) -> impl IntoResponse {
///     format!("user {user_id}")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;

        let user_id: i64 = session
            .get(session_keys::USER_ID)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;

        Ok(Self(UserId::new(user_id)))
    }
}

/// Extractor that requires an admin session.
pub struct RequireAdmin(pub AdminId);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Admin privileges required".to_owned()))?;

        let admin_id: i64 = session
            .get(session_keys::ADMIN_ID)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("Admin privileges required".to_owned()))?;

        Ok(Self(AdminId::new(admin_id)))
    }
}

/// Establish the customer scope on a session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_user(
    session: &Session,
    user_id: UserId,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::USER_ID, user_id.as_i64())
        .await
}

/// Establish the admin scope on a session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin(
    session: &Session,
    admin_id: AdminId,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::ADMIN_ID, admin_id.as_i64())
        .await
}

/// Destroy the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn destroy_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
