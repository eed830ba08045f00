//! Oroshi server - B2B bulk-ordering portal API.
//!
//! One process serves both the customer API (`/api/...`) and the admin API
//! (`/api/admin/...`), over whichever storage engine configuration selected
//! at boot: the embedded file-backed store or a networked `PostgreSQL`
//! server.
//!
//! # Architecture
//!
//! - Axum handlers bind the domain services to the HTTP contracts
//! - [`db`] is the dual-backend persistence adapter; repositories and
//!   services never branch on the active engine
//! - [`services::orders`] is the order lifecycle engine,
//!   [`services::reporting`] the monthly reporting engine
//! - Notifications and documents are collaborators behind narrow seams
//!   ([`services::mailer`], [`services::documents`])

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use state::AppState;

/// Build the complete application router.
///
/// Includes the session layer and request tracing; the general API rate
/// limiter is layered on by `main` so in-process tests exercise the same
/// router without it.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::router())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.db().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
