//! Shipping address repository.

use oroshi_core::{AddressId, UserId};

use crate::db::{Database, RepositoryError};
use crate::models::ShippingAddress;
use crate::params;

/// Fields for creating or replacing a shipping address.
#[derive(Debug)]
pub struct AddressFields {
    pub label: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub is_default: bool,
}

/// Repository for shipping addresses.
///
/// Write paths preserve the invariant that at most one address per user is
/// the default: the existing defaults are cleared before a new one is set.
pub struct AddressRepository<'a> {
    db: &'a Database,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All addresses of a user, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShippingAddress>, RepositoryError> {
        self.db
            .fetch_all(
                "SELECT * FROM shipping_addresses WHERE user_id = ? \
                 ORDER BY is_default DESC, id DESC",
                &params![user_id],
            )
            .await?
            .iter()
            .map(ShippingAddress::from_row)
            .collect()
    }

    /// Get an address by id, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get(&self, id: AddressId) -> Result<Option<ShippingAddress>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM shipping_addresses WHERE id = ?", &params![id])
            .await?
            .map(|row| ShippingAddress::from_row(&row))
            .transpose()
    }

    /// Get an address only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        self.db
            .fetch_optional(
                "SELECT * FROM shipping_addresses WHERE id = ? AND user_id = ?",
                &params![id, user_id],
            )
            .await?
            .map(|row| ShippingAddress::from_row(&row))
            .transpose()
    }

    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: AddressFields,
    ) -> Result<AddressId, RepositoryError> {
        if fields.is_default {
            self.clear_defaults(user_id).await?;
        }
        let id = self
            .db
            .insert(
                "INSERT INTO shipping_addresses \
                 (user_id, label, postal_code, address, phone, is_default) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                &params![
                    user_id,
                    fields.label,
                    fields.postal_code,
                    fields.address,
                    fields.phone,
                    fields.is_default,
                ],
            )
            .await?;
        Ok(AddressId::new(id))
    }

    /// Replace an address's fields; only touches rows owned by the user.
    ///
    /// Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn update_owned(
        &self,
        id: AddressId,
        user_id: UserId,
        fields: AddressFields,
    ) -> Result<bool, RepositoryError> {
        if fields.is_default {
            self.clear_defaults(user_id).await?;
        }
        let affected = self
            .db
            .execute(
                "UPDATE shipping_addresses SET label = ?, postal_code = ?, address = ?, \
                 phone = ?, is_default = ? WHERE id = ? AND user_id = ?",
                &params![
                    fields.label,
                    fields.postal_code,
                    fields.address,
                    fields.phone,
                    fields.is_default,
                    id,
                    user_id,
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Delete an address owned by the user. Returns whether a row was
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let affected = self
            .db
            .execute(
                "DELETE FROM shipping_addresses WHERE id = ? AND user_id = ?",
                &params![id, user_id],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Clear the default flag on every address of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear_defaults(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "UPDATE shipping_addresses SET is_default = 0 WHERE user_id = ?",
                &params![user_id],
            )
            .await?;
        Ok(())
    }
}
