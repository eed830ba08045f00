//! Customer authentication routes: registration, login, password reset.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use base64::Engine as _;
use chrono::{Duration, Utc};
use rand::RngCore as _;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use oroshi_core::{Email, format_timestamp};

use crate::db::reset_tokens::ResetTokenRepository;
use crate::db::users::{NewUser, UserRepository};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::middleware::auth::{destroy_session, set_user};
use crate::middleware::rate_limit::login_rate_limiter;
use crate::models::User;
use crate::services::notify;
use crate::services::password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};
use crate::state::AppState;

/// Reset tokens stay valid for one hour.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication routes. Login is behind the strict rate limiter.
pub fn routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/api/login", post(login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/me", get(me))
        .merge(limited)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterRequest {
    email: String,
    password: String,
    company_name: String,
    last_name: String,
    first_name: String,
    phone: String,
    postal_code: Option<String>,
    address: Option<String>,
}

/// `POST /api/register` - create an account and establish a session.
async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let required = [
        &req.email,
        &req.password,
        &req.company_name,
        &req.last_name,
        &req.first_name,
        &req.phone,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::validation("Please fill in all required fields"));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let email = Email::parse(&req.email)?;

    let users = UserRepository::new(state.db());
    if users.get_by_email(&email).await?.is_some() {
        return Err(AppError::validation(
            "This email address is already registered",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = users
        .create(NewUser {
            email,
            password_hash,
            company_name: req.company_name,
            last_name: req.last_name,
            first_name: req.first_name,
            phone: req.phone,
            postal_code: req.postal_code,
            address: req.address,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::validation("This email address is already registered")
            }
            other => AppError::Database(other),
        })?;

    set_user(&session, user_id).await?;

    Ok(Json(json!({
        "success": true,
        "userId": user_id,
        "message": "Registration complete",
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginRequest {
    email: String,
    password: String,
}

/// `POST /api/login` - establish a customer session.
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let invalid = || AppError::Unauthorized("Incorrect email or password".to_owned());

    let email = Email::parse(&req.email).map_err(|_| invalid())?;
    let (user, stored_hash) = UserRepository::new(state.db())
        .get_password_hash(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &stored_hash)? {
        return Err(invalid());
    }

    set_user(&session, user.id).await?;

    Ok(Json(json!({ "success": true, "userId": user.id })))
}

/// `POST /api/logout` - destroy the session.
async fn logout(session: Session) -> Result<Json<Value>> {
    destroy_session(&session).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForgotPasswordRequest {
    email: String,
}

/// `POST /api/auth/forgot-password` - rotate the reset token and mail a link.
///
/// Responds success whether or not the address is registered, so the
/// endpoint cannot be used to probe for accounts.
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    let response = Json(json!({
        "success": true,
        "message": "Password reset mail sent",
    }));

    let Ok(email) = Email::parse(&req.email) else {
        return Ok(response);
    };
    let Some(user) = UserRepository::new(state.db()).get_by_email(&email).await? else {
        return Ok(response);
    };

    let token = generate_reset_token();
    let expires_at = format_timestamp(Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS));
    ResetTokenRepository::new(state.db())
        .replace_for_user(user.id, &token, &expires_at)
        .await?;

    let reset_link = format!(
        "{}/reset_password.html?token={token}",
        state.config().base_url.trim_end_matches('/')
    );
    notify::dispatch(
        state.mailer(),
        user.email.as_str().to_owned(),
        notify::password_reset_subject(),
        notify::password_reset_body(&user.company_name, &reset_link),
    );

    Ok(response)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResetPasswordRequest {
    token: String,
    password: String,
}

/// `POST /api/auth/reset-password` - consume a reset token.
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    if req.token.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Invalid request"));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let tokens = ResetTokenRepository::new(state.db());
    let token = tokens
        .get(&req.token)
        .await?
        .ok_or_else(|| AppError::validation("Invalid token"))?;
    if token.is_expired() {
        return Err(AppError::validation("Token has expired"));
    }

    let password_hash = hash_password(&req.password)?;
    UserRepository::new(state.db())
        .update_password(token.user_id, &password_hash)
        .await?;

    // Single use: the token is gone after a successful reset.
    tokens.delete(&token.token).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password updated",
    })))
}

/// `GET /api/me` - the authenticated user's profile.
async fn me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.db())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}

/// A 256-bit random token in URL-safe base64.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_tokens_are_unique_and_url_safe() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64 without padding
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
