//! Shipping address routes, all scoped to the authenticated user.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use oroshi_core::AddressId;

use crate::db::addresses::{AddressFields, AddressRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::ShippingAddress;
use crate::state::AppState;

/// Shipping address routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/shipping-addresses",
            get(list_addresses).post(create_address),
        )
        .route(
            "/api/shipping-addresses/{id}",
            axum::routing::put(update_address).delete(delete_address),
        )
}

/// `GET /api/shipping-addresses` - the user's addresses, default first.
async fn list_addresses(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<ShippingAddress>>> {
    let addresses = AddressRepository::new(state.db())
        .list_for_user(user_id)
        .await?;
    Ok(Json(addresses))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddressRequest {
    label: String,
    postal_code: String,
    address: String,
    phone: String,
    is_default: bool,
}

impl AddressRequest {
    fn validate(&self) -> Result<()> {
        let required = [&self.label, &self.postal_code, &self.address, &self.phone];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::validation("Please fill in all required fields"));
        }
        Ok(())
    }

    fn into_fields(self) -> AddressFields {
        AddressFields {
            label: self.label,
            postal_code: self.postal_code,
            address: self.address,
            phone: self.phone,
            is_default: self.is_default,
        }
    }
}

/// `POST /api/shipping-addresses` - add an address.
///
/// Setting `is_default` clears the flag from every other address first, so
/// exactly one default remains.
async fn create_address(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(req): Json<AddressRequest>,
) -> Result<Json<Value>> {
    req.validate()?;
    let address_id = AddressRepository::new(state.db())
        .create(user_id, req.into_fields())
        .await?;
    Ok(Json(json!({
        "success": true,
        "addressId": address_id,
        "message": "Shipping address added",
    })))
}

/// `PUT /api/shipping-addresses/{id}` - update an owned address.
async fn update_address(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<i64>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<Value>> {
    req.validate()?;
    let updated = AddressRepository::new(state.db())
        .update_owned(AddressId::new(id), user_id, req.into_fields())
        .await?;
    if !updated {
        return Err(AppError::not_found("Shipping address not found"));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Shipping address updated",
    })))
}

/// `DELETE /api/shipping-addresses/{id}` - delete an owned address.
async fn delete_address(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let deleted = AddressRepository::new(state.db())
        .delete_owned(AddressId::new(id), user_id)
        .await?;
    if !deleted {
        return Err(AppError::not_found("Shipping address not found"));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Shipping address deleted",
    })))
}
