//! Admin dashboard endpoint, backed by the reporting engine.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use oroshi_core::MonthKey;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::reporting::{Dashboard, ReportingService};
use crate::state::AppState;

/// Dashboard routes (paths relative to `/api/admin`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    /// Target month as `YYYY-MM`; the current month when absent.
    month: Option<String>,
}

/// `GET /api/admin/dashboard?month=YYYY-MM` - the monthly report.
async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>> {
    let target = match query.month.as_deref() {
        Some(month) => month
            .parse::<MonthKey>()
            .map_err(|e| AppError::validation(format!("Invalid month: {e}")))?,
        None => MonthKey::current(),
    };

    let dashboard = ReportingService::new(state.db()).dashboard(target).await?;
    Ok(Json(dashboard))
}
