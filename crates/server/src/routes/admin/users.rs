//! Admin customer directory.

use axum::{Json, Router, extract::State, routing::get};

use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::state::AppState;

/// Admin user routes (paths relative to `/api/admin`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// `GET /api/admin/users` - every registered company, newest first.
async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.db()).list_all().await?;
    Ok(Json(users))
}
