//! Admin routes, nested under `/api/admin`.
//!
//! Every handler except login requires the admin session scope.

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All admin routes (paths relative to `/api/admin`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(dashboard::routes())
        .merge(orders::routes())
        .merge(products::routes())
        .merge(users::routes())
}
