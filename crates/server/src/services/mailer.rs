//! The notification sender collaborator.
//!
//! Posts transactional mail to the `SendGrid` v3 API. The contract toward
//! the rest of the system is `send(to, subject, html)` returning nothing:
//! delivery failures are logged here and never reach the operation that
//! triggered the mail. Without an API key the sender runs disabled and
//! only logs what it would have sent.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::MailConfig;

/// `SendGrid` v3 send endpoint.
const SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Outbound requests that take longer than this are abandoned; a hung mail
/// call must not leak a background task indefinitely.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The API key header could not be constructed.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
}

#[derive(Serialize)]
struct MailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [MailAddress<'a>; 1],
}

#[derive(Serialize)]
struct MailContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: MailAddress<'a>,
    subject: &'a str,
    content: [MailContent<'a>; 1],
}

/// Transactional mail sender.
#[derive(Clone)]
pub struct Mailer {
    client: Option<reqwest::Client>,
    from_email: String,
    from_name: String,
    admin_email: String,
}

impl Mailer {
    /// Create a sender from mail configuration.
    ///
    /// When no API key is configured (or the HTTP client cannot be built)
    /// the sender runs disabled: `send` logs and skips.
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        let client = config.sendgrid_api_key.as_ref().and_then(|key| {
            match build_client(key.expose_secret()) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "mail client unavailable; sending disabled");
                    None
                }
            }
        });
        if client.is_none() {
            tracing::warn!("SENDGRID_API_KEY is not set; mail delivery is disabled");
        }
        Self {
            client,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    /// A sender that never delivers; for tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: None,
            from_email: "orders@oroshi.example".to_owned(),
            from_name: "Oroshi Wholesale".to_owned(),
            admin_email: "admin@oroshi.example".to_owned(),
        }
    }

    /// Recipient address for admin alerts.
    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Send a mail, swallowing any failure.
    ///
    /// This is the collaborator contract: the caller gets nothing back and
    /// can never fail because delivery did.
    pub async fn send(&self, to: &str, subject: &str, html: &str) {
        match self.try_send(to, subject, html).await {
            Ok(()) => {
                tracing::info!(%to, %subject, "mail sent");
            }
            Err(e) => {
                tracing::error!(%to, %subject, error = %e, "mail delivery failed");
            }
        }
    }

    /// Send a mail, reporting the outcome. Used by `send` and by tests.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the request fails or the API rejects it.
    pub async fn try_send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        let Some(client) = &self.client else {
            tracing::warn!(%to, %subject, "mail delivery disabled; skipping");
            return Ok(());
        };

        let body = SendRequest {
            personalizations: [Personalization {
                to: [MailAddress { email: to, name: None }],
            }],
            from: MailAddress {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            subject,
            content: [MailContent {
                content_type: "text/html",
                value: html,
            }],
        };

        let response = client.post(SEND_URL).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

fn build_client(api_key: &str) -> Result<reqwest::Client, MailerError> {
    let mut headers = HeaderMap::new();
    let auth_value = format!("Bearer {api_key}");
    let mut auth = HeaderValue::from_str(&auth_value)
        .map_err(|e| MailerError::InvalidApiKey(e.to_string()))?;
    auth.set_sensitive(true);
    headers.insert("Authorization", auth);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(SEND_TIMEOUT)
        .build()
        .map_err(MailerError::Http)
}
