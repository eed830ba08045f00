//! Admin catalog management.
//!
//! Product images are opaque `image_url` references here; upload and
//! storage mechanics live outside this service.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use oroshi_core::{Money, ProductId};

use crate::db::products::{NewProduct, ProductRepository, ProductUpdate};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

/// Admin product routes (paths relative to `/api/admin`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", axum::routing::put(update_product))
}

/// `GET /api/admin/products` - the whole catalog, inactive included.
async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.db()).list_all().await?;
    Ok(Json(products))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductRequest {
    name: String,
    flavor: Option<String>,
    price: Option<i64>,
    image_url: Option<String>,
    description: Option<String>,
    catch_copy: Option<String>,
    min_quantity: Option<i64>,
    quantity_step: Option<i64>,
    is_active: Option<bool>,
}

impl ProductRequest {
    fn validated_price(&self) -> Result<Money> {
        match self.price {
            Some(price) if !self.name.trim().is_empty() => Ok(Money::new(price)),
            _ => Err(AppError::validation("Product name and price are required")),
        }
    }
}

/// `POST /api/admin/products` - add a catalog product.
async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Value>> {
    let price = req.validated_price()?;

    let product_id = ProductRepository::new(state.db())
        .create(NewProduct {
            name: req.name,
            flavor: req.flavor,
            price,
            image_url: req.image_url,
            description: req.description,
            catch_copy: req.catch_copy,
            min_quantity: req.min_quantity.unwrap_or(10),
            quantity_step: req.quantity_step.unwrap_or(10),
            is_active: req.is_active.unwrap_or(true),
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "productId": product_id,
        "message": "Product added",
    })))
}

/// `PUT /api/admin/products/{id}` - update a catalog product.
///
/// `image_url` is only written when supplied; edits without a new image
/// keep the existing one.
async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Value>> {
    let price = req.validated_price()?;

    let updated = ProductRepository::new(state.db())
        .update(
            ProductId::new(id),
            ProductUpdate {
                name: req.name,
                flavor: req.flavor,
                price,
                image_url: req.image_url,
                description: req.description,
                catch_copy: req.catch_copy,
                min_quantity: req.min_quantity.unwrap_or(10),
                quantity_step: req.quantity_step.unwrap_or(10),
                is_active: req.is_active.unwrap_or(true),
            },
        )
        .await?;
    if !updated {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(json!({ "success": true, "message": "Product updated" })))
}
