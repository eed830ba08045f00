//! Public catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use oroshi_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}

/// `GET /api/products` - the active catalog.
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.db()).list_active().await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}` - one product.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.db())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(Json(product))
}
