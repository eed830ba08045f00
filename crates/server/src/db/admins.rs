//! Administrator account repository.

use oroshi_core::AdminId;

use crate::db::{Database, RepositoryError};
use crate::models::Admin;
use crate::params;

/// Repository for administrator accounts.
pub struct AdminRepository<'a> {
    db: &'a Database,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get an admin by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM admin_users WHERE id = ?", &params![id])
            .await?
            .map(|row| Admin::from_row(&row))
            .transpose()
    }

    /// Get an admin together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let Some(row) = self
            .db
            .fetch_optional(
                "SELECT * FROM admin_users WHERE username = ?",
                &params![username],
            )
            .await?
        else {
            return Ok(None);
        };
        let admin = Admin::from_row(&row)?;
        let hash = row.text("password_hash")?;
        Ok(Some((admin, hash)))
    }

    /// Get the password hash of an admin by id, for change-password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_password_hash_by_id(
        &self,
        id: AdminId,
    ) -> Result<Option<String>, RepositoryError> {
        self.db
            .fetch_optional(
                "SELECT password_hash FROM admin_users WHERE id = ?",
                &params![id],
            )
            .await?
            .map(|row| row.text("password_hash"))
            .transpose()
    }

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_password(
        &self,
        id: AdminId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "UPDATE admin_users SET password_hash = ? WHERE id = ?",
                &params![password_hash, id],
            )
            .await?;
        Ok(())
    }
}
