//! User repository.

use oroshi_core::{Email, UserId, now_timestamp};

use crate::db::{Database, RepositoryError};
use crate::models::User;
use crate::params;

/// Fields for a new user account.
#[derive(Debug)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub company_name: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
}

/// Profile fields an authenticated user may change.
#[derive(Debug)]
pub struct ProfileUpdate {
    pub email: Email,
    pub company_name: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
}

/// Repository for user accounts.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM users WHERE id = ?", &params![id])
            .await?
            .map(|row| User::from_row(&row))
            .transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM users WHERE email = ?", &params![email])
            .await?
            .map(|row| User::from_row(&row))
            .transpose()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(row) = self
            .db
            .fetch_optional("SELECT * FROM users WHERE email = ?", &params![email])
            .await?
        else {
            return Ok(None);
        };
        let user = User::from_row(&row)?;
        let hash = row.text("password_hash")?;
        Ok(Some((user, hash)))
    }

    /// Get the password hash of a user by id, for change-password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_password_hash_by_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        self.db
            .fetch_optional(
                "SELECT password_hash FROM users WHERE id = ?",
                &params![user_id],
            )
            .await?
            .map(|row| row.text("password_hash"))
            .transpose()
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists,
    /// `RepositoryError::Database` otherwise.
    pub async fn create(&self, new_user: NewUser) -> Result<UserId, RepositoryError> {
        let id = self
            .db
            .insert(
                "INSERT INTO users \
                 (email, password_hash, company_name, last_name, first_name, phone, \
                  postal_code, address, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &params![
                    &new_user.email,
                    new_user.password_hash,
                    new_user.company_name,
                    new_user.last_name,
                    new_user.first_name,
                    new_user.phone,
                    new_user.postal_code.unwrap_or_default(),
                    new_user.address.unwrap_or_default(),
                    now_timestamp(),
                ],
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    RepositoryError::Conflict("email already exists".to_owned())
                } else {
                    e
                }
            })?;
        Ok(UserId::new(id))
    }

    /// Whether another account already uses this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_taken_by_other(
        &self,
        email: &Email,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .db
            .fetch_optional(
                "SELECT id FROM users WHERE email = ? AND id != ?",
                &params![email, user_id],
            )
            .await?
            .is_some())
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "UPDATE users SET company_name = ?, last_name = ?, first_name = ?, \
                 phone = ?, postal_code = ?, address = ?, email = ? WHERE id = ?",
                &params![
                    update.company_name,
                    update.last_name,
                    update.first_name,
                    update.phone,
                    update.postal_code.unwrap_or_default(),
                    update.address.unwrap_or_default(),
                    &update.email,
                    user_id,
                ],
            )
            .await?;
        Ok(())
    }

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "UPDATE users SET password_hash = ? WHERE id = ?",
                &params![password_hash, user_id],
            )
            .await?;
        Ok(())
    }

    /// All registered users, newest first (admin directory).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.db
            .fetch_all("SELECT * FROM users ORDER BY created_at DESC, id DESC", &[])
            .await?
            .iter()
            .map(User::from_row)
            .collect()
    }
}
