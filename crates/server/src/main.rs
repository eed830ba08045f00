//! Oroshi server binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use oroshi_server::{AppConfig, AppState, app};

use oroshi_server::db::{Database, schema};
use oroshi_server::middleware::api_rate_limiter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter.
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "oroshi_server=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Connect to the configured storage backend
    let db = Database::connect(&config.database)
        .await
        .expect("Failed to connect to database");
    tracing::info!(backend = db.backend_name(), "database connected");

    // Create tables and seed the initial admin account / default product
    schema::init(&db).await.expect("Failed to initialize schema");
    schema::seed(&db, &config.admin_seed)
        .await
        .expect("Failed to seed database");

    // Build application state and router
    let addr = config.socket_addr();
    let state = AppState::new(config, db);
    let app = app(state).layer(api_rate_limiter());

    tracing::info!("oroshi server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
