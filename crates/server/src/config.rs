//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend selection
//! - `DATABASE_URL` - when set, the networked `PostgreSQL` backend is used
//! - `OROSHI_SQLITE_PATH` - embedded store file when `DATABASE_URL` is unset
//!   (default: `oroshi.db`)
//!
//! ## Optional
//! - `OROSHI_HOST` - bind address (default: 127.0.0.1)
//! - `OROSHI_PORT` - listen port (default: 3000)
//! - `OROSHI_BASE_URL` - public URL used in password-reset links
//! - `SENDGRID_API_KEY` - mail delivery is disabled (logged only) when unset
//! - `FROM_EMAIL`, `FROM_NAME` - notification sender identity
//! - `ADMIN_EMAIL` - recipient of new-order alerts
//! - `OROSHI_PAYMENT_INSTRUCTIONS` - bank-transfer block appended to order
//!   confirmation mails
//! - `OROSHI_ADMIN_USERNAME`, `OROSHI_ADMIN_PASSWORD` - initial admin
//!   account seeded on first boot

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which storage engine to run, decided once at boot.
#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    /// Embedded file-backed SQLite store.
    Embedded { path: PathBuf },
    /// Networked `PostgreSQL` server (contains password).
    Networked { url: SecretString },
}

/// Notification sender configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// `SendGrid` API key; mail is logged and skipped when absent.
    pub sendgrid_api_key: Option<SecretString>,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Recipient of admin order alerts.
    pub admin_email: String,
    /// Bank-transfer block shown in order confirmation mails.
    pub payment_instructions: Option<String>,
}

/// Initial admin account, seeded if no admin with the username exists.
#[derive(Clone)]
pub struct AdminSeedConfig {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminSeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeedConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Public base URL, used to build password-reset links.
    pub base_url: String,
    /// Storage backend selection.
    pub database: DatabaseConfig,
    /// Notification sender settings.
    pub mail: MailConfig,
    /// Initial admin account.
    pub admin_seed: AdminSeedConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("OROSHI_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("OROSHI_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("OROSHI_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("OROSHI_PORT".to_owned(), e.to_string()))?;
        let base_url = get_env_or_default("OROSHI_BASE_URL", "http://localhost:3000");

        let database = if let Some(url) = get_optional_env("DATABASE_URL") {
            DatabaseConfig::Networked {
                url: SecretString::from(url),
            }
        } else {
            DatabaseConfig::Embedded {
                path: PathBuf::from(get_env_or_default("OROSHI_SQLITE_PATH", "oroshi.db")),
            }
        };

        let mail = MailConfig {
            sendgrid_api_key: get_optional_env("SENDGRID_API_KEY").map(SecretString::from),
            from_email: get_env_or_default("FROM_EMAIL", "orders@oroshi.example"),
            from_name: get_env_or_default("FROM_NAME", "Oroshi Wholesale"),
            admin_email: get_env_or_default("ADMIN_EMAIL", "admin@oroshi.example"),
            payment_instructions: get_optional_env("OROSHI_PAYMENT_INSTRUCTIONS"),
        };

        let admin_seed = AdminSeedConfig {
            username: get_env_or_default("OROSHI_ADMIN_USERNAME", "admin"),
            password: SecretString::from(get_env_or_default("OROSHI_ADMIN_PASSWORD", "admin123")),
        };

        Ok(Self {
            host,
            port,
            base_url,
            database,
            mail,
            admin_seed,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the deployment is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            database: DatabaseConfig::Embedded {
                path: PathBuf::from("test.db"),
            },
            mail: MailConfig {
                sendgrid_api_key: None,
                from_email: "orders@oroshi.example".to_owned(),
                from_name: "Oroshi Wholesale".to_owned(),
                admin_email: "admin@oroshi.example".to_owned(),
                payment_instructions: None,
            },
            admin_seed: AdminSeedConfig {
                username: "admin".to_owned(),
                password: SecretString::from("admin123"),
            },
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_base_url_scheme() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = "https://orders.example.com".to_owned();
        assert!(config.is_secure());
    }

    #[test]
    fn test_admin_seed_debug_redacts_password() {
        let config = test_config();
        let debug_output = format!("{:?}", config.admin_seed);
        assert!(debug_output.contains("admin"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("admin123"));
    }
}
