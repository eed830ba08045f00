//! HTTP route handlers.
//!
//! Customer routes live under `/api`, admin routes under `/api/admin`; the
//! two surfaces share the server but have independent session scopes.

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod documents;
pub mod orders;
pub mod products;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// All API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(addresses::routes())
        .merge(orders::routes())
        .nest("/api/admin", admin::routes())
}
