//! HTTP middleware: sessions, auth extractors, rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{RequireAdmin, RequireUser, session_keys};
pub use rate_limit::{api_rate_limiter, login_rate_limiter};
pub use session::create_session_layer;
