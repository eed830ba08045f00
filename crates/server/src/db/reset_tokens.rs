//! Password-reset token repository.

use oroshi_core::{UserId, now_timestamp};

use crate::db::{Database, RepositoryError};
use crate::params;

/// A live password-reset token.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: String,
}

impl ResetToken {
    /// Whether the token's expiry instant has passed.
    ///
    /// Stored timestamps are zero-padded, so a string comparison against
    /// the current instant is a chronological comparison.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at < now_timestamp()
    }
}

/// Repository for password-reset tokens.
///
/// Tokens are single-use and at most one is live per user: issuing a new
/// token deletes the previous one, and a successful reset deletes the
/// token it consumed.
pub struct ResetTokenRepository<'a> {
    db: &'a Database,
}

impl<'a> ResetTokenRepository<'a> {
    /// Create a new reset-token repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Delete any previous token for the user, then store the new one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn replace_for_user(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: &str,
    ) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "DELETE FROM password_reset_tokens WHERE user_id = ?",
                &params![user_id],
            )
            .await?;
        self.db
            .execute(
                "INSERT INTO password_reset_tokens (token, user_id, expires_at, created_at) \
                 VALUES (?, ?, ?, ?)",
                &params![token, user_id, expires_at, now_timestamp()],
            )
            .await?;
        Ok(())
    }

    /// Look up a token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get(&self, token: &str) -> Result<Option<ResetToken>, RepositoryError> {
        let Some(row) = self
            .db
            .fetch_optional(
                "SELECT * FROM password_reset_tokens WHERE token = ?",
                &params![token],
            )
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(ResetToken {
            token: row.text("token")?,
            user_id: UserId::new(row.i64("user_id")?),
            expires_at: row.text("expires_at")?,
        }))
    }

    /// Delete a token (after a successful reset).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.db
            .execute(
                "DELETE FROM password_reset_tokens WHERE token = ?",
                &params![token],
            )
            .await?;
        Ok(())
    }
}
