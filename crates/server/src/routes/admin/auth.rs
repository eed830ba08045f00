//! Admin authentication routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::db::admins::AdminRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::middleware::auth::{destroy_session, set_admin};
use crate::middleware::rate_limit::login_rate_limiter;
use crate::models::Admin;
use crate::services::password::{MIN_ADMIN_PASSWORD_LENGTH, hash_password, verify_password};
use crate::state::AppState;

/// Admin auth routes. Login is behind the strict rate limiter.
pub fn routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
        .merge(limited)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdminLoginRequest {
    username: String,
    password: String,
}

/// `POST /api/admin/login` - establish an admin session.
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<Value>> {
    let invalid = || AppError::Unauthorized("Incorrect username or password".to_owned());

    let (admin, stored_hash) = AdminRepository::new(state.db())
        .get_password_hash(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &stored_hash)? {
        return Err(invalid());
    }

    set_admin(&session, admin.id).await?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /api/admin/logout` - destroy the session.
async fn logout(session: Session) -> Result<Json<Value>> {
    destroy_session(&session).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/admin/me` - the authenticated admin.
async fn me(
    State(state): State<AppState>,
    RequireAdmin(admin_id): RequireAdmin,
) -> Result<Json<Admin>> {
    let admin = AdminRepository::new(state.db())
        .get(admin_id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin not found"))?;
    Ok(Json(admin))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

/// `POST /api/admin/change-password` - change the admin password.
async fn change_password(
    State(state): State<AppState>,
    RequireAdmin(admin_id): RequireAdmin,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::validation("Please fill in all required fields"));
    }
    if req.new_password.len() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"
        )));
    }

    let admins = AdminRepository::new(state.db());
    let stored_hash = admins
        .get_password_hash_by_id(admin_id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin not found"))?;

    if !verify_password(&req.current_password, &stored_hash)? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_owned(),
        ));
    }

    let new_hash = hash_password(&req.new_password)?;
    admins.update_password(admin_id, &new_hash).await?;

    Ok(Json(json!({ "success": true, "message": "Password changed" })))
}
