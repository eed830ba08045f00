//! Authenticated profile routes.

use axum::{Json, Router, extract::State, routing::put};
use serde::Deserialize;
use serde_json::{Value, json};

use oroshi_core::Email;

use crate::db::users::{ProfileUpdate, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};
use crate::state::AppState;

/// Profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", put(update_profile))
        .route("/api/profile/password", put(change_password))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateProfileRequest {
    company_name: String,
    last_name: String,
    first_name: String,
    phone: String,
    postal_code: Option<String>,
    address: Option<String>,
    email: Option<String>,
}

/// `PUT /api/profile` - update account details.
///
/// The email only changes when one is supplied, and never to an address
/// another account already uses.
async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let required = [&req.company_name, &req.last_name, &req.first_name, &req.phone];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::validation("Please fill in all required fields"));
    }

    let users = UserRepository::new(state.db());
    let current = users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let email = match req.email.as_deref().map(str::trim) {
        Some(new_email) if !new_email.is_empty() => {
            let new_email = Email::parse(new_email)?;
            if users.email_taken_by_other(&new_email, user_id).await? {
                return Err(AppError::validation(
                    "This email address is already in use",
                ));
            }
            new_email
        }
        _ => current.email,
    };

    users
        .update_profile(
            user_id,
            ProfileUpdate {
                email,
                company_name: req.company_name,
                last_name: req.last_name,
                first_name: req.first_name,
                phone: req.phone,
                postal_code: req.postal_code,
                address: req.address,
            },
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Profile updated" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

/// `PUT /api/profile/password` - change the password after verifying the
/// current one.
async fn change_password(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::validation("Please enter a password"));
    }
    if req.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let users = UserRepository::new(state.db());
    let stored_hash = users
        .get_password_hash_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !verify_password(&req.current_password, &stored_hash)? {
        return Err(AppError::validation("Current password is incorrect"));
    }

    let new_hash = hash_password(&req.new_password)?;
    users.update_password(user_id, &new_hash).await?;

    Ok(Json(json!({ "success": true, "message": "Password updated" })))
}
