//! Schema creation and first-boot seeding.
//!
//! Both engines get the same logical schema; the DDL differs only in the
//! id column type. Timestamps are TEXT on both engines because the
//! application writes them itself in the canonical zero-padded form -
//! the database never generates a time.

use secrecy::ExposeSecret;

use oroshi_core::now_timestamp;

use crate::config::AdminSeedConfig;
use crate::db::{Database, RepositoryError};
use crate::params;
use crate::services::password::hash_password;

const SQLITE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        company_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        first_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        postal_code TEXT,
        address TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS shipping_addresses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        label TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        address TEXT NOT NULL,
        phone TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        flavor TEXT,
        price INTEGER NOT NULL,
        image_url TEXT,
        description TEXT,
        catch_copy TEXT,
        min_quantity INTEGER NOT NULL DEFAULT 10,
        quantity_step INTEGER NOT NULL DEFAULT 10,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        product_id INTEGER,
        shipping_address_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL,
        unit_price INTEGER,
        total_price INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'received',
        payment_confirmed INTEGER NOT NULL DEFAULT 0,
        payment_date TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (shipping_address_id) REFERENCES shipping_addresses(id),
        FOREIGN KEY (product_id) REFERENCES products(id)
    )",
    "CREATE TABLE IF NOT EXISTS admin_users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS password_reset_tokens (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL,
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )",
];

const POSTGRES_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        company_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        first_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        postal_code TEXT,
        address TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS shipping_addresses (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        label TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        address TEXT NOT NULL,
        phone TEXT NOT NULL,
        is_default BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        flavor TEXT,
        price BIGINT NOT NULL,
        image_url TEXT,
        description TEXT,
        catch_copy TEXT,
        min_quantity BIGINT NOT NULL DEFAULT 10,
        quantity_step BIGINT NOT NULL DEFAULT 10,
        is_active BIGINT NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        product_id BIGINT REFERENCES products(id),
        shipping_address_id BIGINT NOT NULL REFERENCES shipping_addresses(id),
        quantity BIGINT NOT NULL,
        unit_price BIGINT,
        total_price BIGINT NOT NULL,
        status TEXT NOT NULL DEFAULT 'received',
        payment_confirmed BIGINT NOT NULL DEFAULT 0,
        payment_date TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS admin_users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS password_reset_tokens (
        token TEXT PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

/// Create all tables if they do not exist yet.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any DDL statement fails.
pub async fn init(db: &Database) -> Result<(), RepositoryError> {
    let tables = match db {
        Database::Sqlite(_) => SQLITE_TABLES,
        Database::Postgres(_) => POSTGRES_TABLES,
    };
    for ddl in tables {
        db.execute(ddl, &[]).await?;
    }
    Ok(())
}

/// Idempotent first-boot seeding: the initial admin account and, when the
/// catalog is empty, one default product.
///
/// # Errors
///
/// Returns `RepositoryError` if a seed query fails or the admin password
/// cannot be hashed.
pub async fn seed(db: &Database, admin_seed: &AdminSeedConfig) -> Result<(), RepositoryError> {
    let admin_exists = db
        .fetch_optional(
            "SELECT id FROM admin_users WHERE username = ?",
            &params![admin_seed.username.as_str()],
        )
        .await?
        .is_some();
    if !admin_exists {
        let hash = hash_password(admin_seed.password.expose_secret())
            .map_err(|e| RepositoryError::DataCorruption(format!("seed admin hash: {e}")))?;
        db.insert(
            "INSERT INTO admin_users (username, password_hash, created_at) VALUES (?, ?, ?)",
            &params![admin_seed.username.as_str(), hash, now_timestamp()],
        )
        .await?;
        tracing::info!(username = %admin_seed.username, "seeded initial admin account");
        if admin_seed.password.expose_secret() == "admin123" {
            tracing::warn!(
                "initial admin account uses the default password; set OROSHI_ADMIN_PASSWORD"
            );
        }
    }

    let catalog_empty = db
        .fetch_optional("SELECT id FROM products LIMIT 1", &[])
        .await?
        .is_none();
    if catalog_empty {
        db.insert(
            "INSERT INTO products \
             (name, flavor, price, image_url, description, min_quantity, quantity_step, \
              is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            &params![
                "BASE",
                "Cocoa",
                1500i64,
                "/product.png",
                "High-quality formula with no unnecessary additives. Gentle on the gut, \
                 with a balanced profile that makes it easy to build a protein habit.",
                10i64,
                10i64,
                true,
                now_timestamp(),
            ],
        )
        .await?;
        tracing::info!("seeded default catalog product");
    }

    Ok(())
}
