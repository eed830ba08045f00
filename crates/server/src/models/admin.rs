//! Administrator account.

use serde::Serialize;

use oroshi_core::AdminId;

use crate::db::{RepositoryError, Row};

/// An administrator account; unrelated to customer users.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub created_at: String,
}

impl Admin {
    /// Build an `Admin` from an adapter row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing columns.
    pub fn from_row(row: &Row) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: AdminId::new(row.i64("id")?),
            username: row.text("username")?,
            created_at: row.text("created_at")?,
        })
    }
}
