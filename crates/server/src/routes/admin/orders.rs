//! Admin order management: listing, status transitions, payment
//! confirmation, and documents.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

use oroshi_core::{OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::OrderDetails;
use crate::routes::documents;
use crate::services::documents::DocumentKind;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Admin order routes (paths relative to `/api/admin`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", put(update_status))
        .route("/orders/{id}/payment", put(update_payment))
        .route("/orders/{id}/invoice", get(order_invoice))
        .route("/orders/{id}/receipt", get(order_receipt))
}

/// `GET /api/admin/orders` - every order with orderer, product, and
/// shipping address, newest first.
async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<OrderDetails>>> {
    let orders = OrderRepository::new(state.db()).list_all_detailed().await?;
    Ok(Json(orders))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateStatusRequest {
    status: Option<String>,
}

/// `PUT /api/admin/orders/{id}` - set the fulfillment status.
///
/// `shipped` and `cancelled` trigger customer notices; see the lifecycle
/// engine.
async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| AppError::validation("Please specify a status"))?;
    let status: OrderStatus = status
        .parse()
        .map_err(|_| AppError::validation("Unknown status"))?;

    OrderService::new(state.db(), state.mailer(), None)
        .update_status(OrderId::new(id), status)
        .await?;

    Ok(Json(json!({ "success": true, "message": "Status updated" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdatePaymentRequest {
    payment_confirmed: Option<bool>,
    payment_date: Option<String>,
}

/// `PUT /api/admin/orders/{id}/payment` - record payment confirmation.
async fn update_payment(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<Value>> {
    let confirmed = req.payment_confirmed.ok_or_else(|| {
        AppError::validation("Please specify the payment confirmation status")
    })?;

    OrderService::new(state.db(), state.mailer(), None)
        .confirm_payment(OrderId::new(id), confirmed, req.payment_date)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Payment information updated",
    })))
}

/// `GET /api/admin/orders/{id}/invoice` - invoice document.
async fn order_invoice(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    order_document(&state, OrderId::new(id), DocumentKind::Invoice).await
}

/// `GET /api/admin/orders/{id}/receipt` - receipt document.
async fn order_receipt(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    order_document(&state, OrderId::new(id), DocumentKind::Receipt).await
}

async fn order_document(
    state: &AppState,
    order_id: OrderId,
    kind: DocumentKind,
) -> Result<Response> {
    let order = OrderRepository::new(state.db())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let doc = documents::assemble(state.db(), &order).await?;
    documents::respond(kind, &doc)
}
