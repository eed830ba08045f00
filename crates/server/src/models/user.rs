//! Registered company account.

use serde::Serialize;

use oroshi_core::{Email, UserId};

use crate::db::{RepositoryError, Row};

/// A registered company account.
///
/// The password hash is never part of this struct; repositories hand it out
/// separately where login needs it, so serializing a `User` can never leak
/// credentials.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub company_name: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
}

impl User {
    /// Build a `User` from an adapter row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing columns or an
    /// invalid stored email.
    pub fn from_row(row: &Row) -> Result<Self, RepositoryError> {
        let email = Email::parse(&row.text("email")?).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.i64("id")?),
            email,
            company_name: row.text("company_name")?,
            last_name: row.text("last_name")?,
            first_name: row.text("first_name")?,
            phone: row.text("phone")?,
            postal_code: row.opt_text("postal_code")?,
            address: row.opt_text("address")?,
            created_at: row.text("created_at")?,
        })
    }

    /// Contact person's full name as displayed in admin views and mails.
    #[must_use]
    pub fn contact_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}
