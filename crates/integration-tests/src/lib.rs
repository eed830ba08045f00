//! Test harness for driving the oroshi router in-process.
//!
//! Builds the real application router over an in-memory embedded store and
//! issues requests through `tower::ServiceExt::oneshot`; no listener, no
//! network. Session cookies are threaded manually so a test can hold a
//! customer session and an admin session side by side.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use oroshi_server::config::{AdminSeedConfig, AppConfig, DatabaseConfig, MailConfig};
use oroshi_server::db::{Database, schema};
use oroshi_server::{AppState, app};

/// Password the test admin account is seeded with.
pub const ADMIN_PASSWORD: &str = "integration-admin-pw";

/// A router over a fresh in-memory store, plus the store handle for
/// assertions that look behind the API.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    /// Stand up the application over a fresh in-memory store.
    pub async fn spawn() -> Self {
        let db = Database::connect_sqlite_memory()
            .await
            .expect("in-memory store");
        schema::init(&db).await.expect("schema init");

        let config = test_config();
        schema::seed(&db, &config.admin_seed).await.expect("seed");

        let state = AppState::new(config, db.clone());
        Self {
            router: app(state),
            db,
        }
    }

    /// Issue one request. `cookie` carries a previously captured session.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        TestResponse::from_response(response).await
    }
}

/// A collected response: status, session cookie (if set), raw body.
pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);
        let content_disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        Self {
            status,
            cookie,
            content_disposition,
            body,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// The body as text (documents).
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("UTF-8 body")
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        // The state never reconnects; the router runs on the handle passed
        // to `AppState`, so this field is inert here.
        database: DatabaseConfig::Embedded {
            path: "unused.db".into(),
        },
        mail: MailConfig {
            sendgrid_api_key: None,
            from_email: "orders@oroshi.example".to_owned(),
            from_name: "Oroshi Wholesale".to_owned(),
            admin_email: "admin@oroshi.example".to_owned(),
            payment_instructions: Some(
                "Transfer to account 0000000 at Example Bank.".to_owned(),
            ),
        },
        admin_seed: AdminSeedConfig {
            username: "admin".to_owned(),
            password: SecretString::from(ADMIN_PASSWORD),
        },
    }
}
