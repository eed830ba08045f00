//! Customer order routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use oroshi_core::{AddressId, OrderId, ProductId};

use crate::db::addresses::AddressRepository;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::OrderView;
use crate::routes::documents;
use crate::services::documents::DocumentKind;
use crate::services::orders::{CreateOrder, OrderService};
use crate::state::AppState;

/// Customer order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/receipt", get(order_receipt))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateOrderRequest {
    product_id: Option<i64>,
    shipping_address_id: Option<i64>,
    quantity: Option<i64>,
}

/// `POST /api/orders` - place an order.
async fn create_order(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let (Some(shipping_address_id), Some(quantity)) = (req.shipping_address_id, req.quantity)
    else {
        return Err(AppError::validation(
            "Please specify a shipping address and quantity",
        ));
    };

    let service = OrderService::new(
        state.db(),
        state.mailer(),
        state.config().mail.payment_instructions.as_deref(),
    );
    let order_id = service
        .create(
            user_id,
            CreateOrder {
                product_id: req.product_id.map(ProductId::new),
                shipping_address_id: AddressId::new(shipping_address_id),
                quantity,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "orderId": order_id,
            "message": "Order received",
        })),
    ))
}

/// `GET /api/orders` - the user's order history, newest first.
async fn list_orders(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.db())
        .list_for_user(user_id)
        .await?;
    Ok(Json(orders.into_iter().map(OrderView::new).collect()))
}

/// `GET /api/orders/{id}` - one owned order with its shipping address.
async fn get_order(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderView>> {
    let order = OrderRepository::new(state.db())
        .get_owned(OrderId::new(id), user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let address = AddressRepository::new(state.db())
        .get(order.shipping_address_id)
        .await?;

    let mut view = OrderView::new(order);
    if let Some(address) = address {
        view = view.with_shipping_address(address);
    }
    Ok(Json(view))
}

/// `GET /api/orders/{id}/receipt` - receipt document for an owned order.
async fn order_receipt(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<i64>,
) -> Result<Response> {
    let order = OrderRepository::new(state.db())
        .get_owned(OrderId::new(id), user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let doc = documents::assemble(state.db(), &order).await?;
    documents::respond(DocumentKind::Receipt, &doc)
}
