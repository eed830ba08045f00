//! The persistence adapter: one query interface over two SQL engines.
//!
//! Business logic talks to [`Database`] and never branches on which engine
//! is active. SQL is written once with positional `?` placeholders; the
//! adapter translates them to `$1..$n` for `PostgreSQL` and leaves them
//! untouched for SQLite. Both engines produce the same [`Row`] shape
//! (column name to [`SqlValue`]), so repositories decode rows identically.
//!
//! # Backends
//!
//! - **Embedded** (SQLite file): the pool is capped at a single connection,
//!   so mutations serialize through one in-process writer, and the
//!   connection runs with `synchronous=FULL` so a mutating call is durably
//!   on disk before it returns.
//! - **Networked** (`PostgreSQL`): a regular multi-connection pool; the
//!   engine's own per-statement transactional guarantees apply. New-row ids
//!   come back via a `RETURNING id` clause because a separate sequence
//!   query could read another pooled connection's value.
//!
//! Query failures propagate as [`RepositoryError`]; nothing retries.

pub mod addresses;
pub mod admins;
pub mod orders;
pub mod products;
pub mod reset_tokens;
pub mod schema;
pub mod users;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgArguments, PgPoolOptions, Postgres};
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Row as _, SqlitePool};

use crate::config::DatabaseConfig;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the underlying engine reported a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// A dynamically-typed SQL value, the common denominator of both engines.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<oroshi_core::Money> for SqlValue {
    fn from(v: oroshi_core::Money) -> Self {
        Self::Integer(v.amount())
    }
}

impl From<oroshi_core::OrderStatus> for SqlValue {
    fn from(v: oroshi_core::OrderStatus) -> Self {
        Self::Text(v.as_str().to_owned())
    }
}

impl From<&oroshi_core::Email> for SqlValue {
    fn from(v: &oroshi_core::Email) -> Self {
        Self::Text(v.as_str().to_owned())
    }
}

macro_rules! impl_sql_value_for_id {
    ($($name:ty),+ $(,)?) => {
        $(
            impl From<$name> for SqlValue {
                fn from(v: $name) -> Self {
                    Self::Integer(v.as_i64())
                }
            }
        )+
    };
}

impl_sql_value_for_id!(
    oroshi_core::UserId,
    oroshi_core::AddressId,
    oroshi_core::ProductId,
    oroshi_core::OrderId,
    oroshi_core::AdminId,
);

/// Build a `Vec<SqlValue>` parameter list from mixed value types.
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::db::SqlValue>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::db::SqlValue::from($v)),+]
    };
}

/// A decoded result row: column name to value, identical for both engines.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<(String, SqlValue)>,
}

impl Row {
    /// Raw value of a column, if the column exists.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    fn required(&self, column: &str) -> Result<&SqlValue, RepositoryError> {
        self.value(column).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("missing column: {column}"))
        })
    }

    /// Integer value with defensive coercion.
    ///
    /// Some engines hand aggregate sums back as string-typed large integers;
    /// `Text` and `Real` values coerce before any arithmetic happens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the column is missing,
    /// NULL, or not coercible to an integer.
    pub fn i64(&self, column: &str) -> Result<i64, RepositoryError> {
        match self.required(column)? {
            SqlValue::Integer(v) => Ok(*v),
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Real(v) => Ok(*v as i64),
            SqlValue::Text(v) => v.trim().parse().map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "column {column} is not an integer: {v}"
                ))
            }),
            other => Err(RepositoryError::DataCorruption(format!(
                "column {column} is not an integer: {other:?}"
            ))),
        }
    }

    /// Nullable integer value with the same coercion as [`Row::i64`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the column is missing or
    /// non-NULL but not coercible.
    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, RepositoryError> {
        match self.required(column)? {
            SqlValue::Null => Ok(None),
            _ => self.i64(column).map(Some),
        }
    }

    /// Text value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the column is missing,
    /// NULL, or not text.
    pub fn text(&self, column: &str) -> Result<String, RepositoryError> {
        match self.required(column)? {
            SqlValue::Text(v) => Ok(v.clone()),
            other => Err(RepositoryError::DataCorruption(format!(
                "column {column} is not text: {other:?}"
            ))),
        }
    }

    /// Nullable text value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the column is missing or
    /// non-NULL and not text.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, RepositoryError> {
        match self.required(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.clone())),
            other => Err(RepositoryError::DataCorruption(format!(
                "column {column} is not text: {other:?}"
            ))),
        }
    }

    /// Integer flag column (`0`/`1`) as a bool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the column is missing or
    /// not coercible to an integer.
    pub fn flag(&self, column: &str) -> Result<bool, RepositoryError> {
        Ok(self.i64(column)? != 0)
    }

    #[cfg(test)]
    fn from_pairs(pairs: Vec<(&str, SqlValue)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, v)| (name.to_owned(), v))
                .collect(),
        }
    }
}

/// Translate positional `?` placeholders to `$1..$n`.
///
/// Placeholders inside single-quoted literals and double-quoted identifiers
/// are left alone.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0u32;
    let mut in_single = false;
    let mut in_double = false;
    for c in sql.chars() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '?' if !in_single && !in_double => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Blob(v) => query.bind(v.clone()),
    }
}

fn bind_postgres<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Blob(v) => query.bind(v.clone()),
    }
}

fn row_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> Row {
    let mut values = Vec::with_capacity(row.columns().len());
    for (i, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Integer)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Real)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Text)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Blob)
        } else {
            SqlValue::Null
        };
        values.push((column.name().to_owned(), value));
    }
    Row { values }
}

fn row_from_postgres(row: &sqlx::postgres::PgRow) -> Row {
    let mut values = Vec::with_capacity(row.columns().len());
    for (i, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Integer)
        } else if let Ok(v) = row.try_get::<Option<i32>, _>(i) {
            v.map_or(SqlValue::Null, |v| SqlValue::Integer(i64::from(v)))
        } else if let Ok(v) = row.try_get::<Option<i16>, _>(i) {
            v.map_or(SqlValue::Null, |v| SqlValue::Integer(i64::from(v)))
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Real)
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(i) {
            v.map_or(SqlValue::Null, |v| SqlValue::Integer(i64::from(v)))
        } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Text)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(i) {
            v.map_or(SqlValue::Null, SqlValue::Blob)
        } else {
            SqlValue::Null
        };
        values.push((column.name().to_owned(), value));
    }
    Row { values }
}

/// Handle to whichever storage engine the deployment selected at boot.
#[derive(Clone)]
pub enum Database {
    /// Embedded single-writer SQLite file.
    Sqlite(SqlitePool),
    /// Networked `PostgreSQL` server.
    Postgres(PgPool),
}

impl Database {
    /// Connect to the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        match config {
            DatabaseConfig::Embedded { path } => Self::connect_sqlite(path).await,
            DatabaseConfig::Networked { url } => Self::connect_postgres(url).await,
        }
    }

    /// Open (or create) the embedded file-backed store.
    ///
    /// The pool holds exactly one connection: the store has a single
    /// in-process writer, and `synchronous=FULL` makes every committed
    /// mutation durable before the call returns.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the file cannot be opened.
    pub async fn connect_sqlite(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::Sqlite(pool))
    }

    /// Open an in-memory embedded store (tests and local experiments).
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect_sqlite_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // A single never-recycled connection; recycling would drop the store.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::Sqlite(pool))
    }

    /// Connect to the networked `PostgreSQL` backend.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect_postgres(url: &SecretString) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url.expose_secret())
            .await?;
        Ok(Self::Postgres(pool))
    }

    /// Which engine is active, for startup logs.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Run a mutating statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, RepositoryError> {
        match self {
            Self::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for value in params {
                    query = bind_sqlite(query, value);
                }
                Ok(query.execute(pool).await?.rows_affected())
            }
            Self::Postgres(pool) => {
                let sql = numbered_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for value in params {
                    query = bind_postgres(query, value);
                }
                Ok(query.execute(pool).await?.rows_affected())
            }
        }
    }

    /// Run an `INSERT` and return the new row's id.
    ///
    /// SQLite reads `last_insert_rowid()` off the statement result;
    /// `PostgreSQL` gets a `RETURNING id` clause appended, which stays on
    /// the executing connection (a pooled sequence query would not).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails, or
    /// `RepositoryError::DataCorruption` if no id comes back.
    pub async fn insert(&self, sql: &str, params: &[SqlValue]) -> Result<i64, RepositoryError> {
        match self {
            Self::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for value in params {
                    query = bind_sqlite(query, value);
                }
                Ok(query.execute(pool).await?.last_insert_rowid())
            }
            Self::Postgres(pool) => {
                let sql = format!("{} RETURNING id", numbered_placeholders(sql));
                let mut query = sqlx::query(&sql);
                for value in params {
                    query = bind_postgres(query, value);
                }
                let row = query.fetch_one(pool).await?;
                row_from_postgres(&row).i64("id")
            }
        }
    }

    /// Fetch at most one row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch_optional(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<Row>, RepositoryError> {
        match self {
            Self::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for value in params {
                    query = bind_sqlite(query, value);
                }
                Ok(query
                    .fetch_optional(pool)
                    .await?
                    .map(|row| row_from_sqlite(&row)))
            }
            Self::Postgres(pool) => {
                let sql = numbered_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for value in params {
                    query = bind_postgres(query, value);
                }
                Ok(query
                    .fetch_optional(pool)
                    .await?
                    .map(|row| row_from_postgres(&row)))
            }
        }
    }

    /// Fetch all result rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch_all(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Row>, RepositoryError> {
        match self {
            Self::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for value in params {
                    query = bind_sqlite(query, value);
                }
                Ok(query
                    .fetch_all(pool)
                    .await?
                    .iter()
                    .map(row_from_sqlite)
                    .collect())
            }
            Self::Postgres(pool) => {
                let sql = numbered_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for value in params {
                    query = bind_postgres(query, value);
                }
                Ok(query
                    .fetch_all(pool)
                    .await?
                    .iter()
                    .map(row_from_postgres)
                    .collect())
            }
        }
    }

    /// Verify connectivity (readiness probe).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.fetch_optional("SELECT 1", &[]).await?;
        Ok(())
    }
}
