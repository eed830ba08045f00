//! Customer shipping address.

use serde::Serialize;

use oroshi_core::{AddressId, UserId};

use crate::db::{RepositoryError, Row};

/// A shipping address owned by one user.
///
/// At most one address per user carries `is_default`; the repository clears
/// the others before setting it.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub is_default: bool,
}

impl ShippingAddress {
    /// Build a `ShippingAddress` from an adapter row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing columns.
    pub fn from_row(row: &Row) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: AddressId::new(row.i64("id")?),
            user_id: UserId::new(row.i64("user_id")?),
            label: row.text("label")?,
            postal_code: row.text("postal_code")?,
            address: row.text("address")?,
            phone: row.text("phone")?,
            is_default: row.flag("is_default")?,
        })
    }
}
