//! Domain services.
//!
//! - [`orders`] - the order lifecycle engine (creation, status transitions,
//!   payment confirmation, notification side effects)
//! - [`reporting`] - monthly aggregation and the dashboard summary
//! - [`mailer`] / [`notify`] - the fire-and-forget notification collaborator
//! - [`documents`] - invoice/receipt data assembly and rendering seam
//! - [`password`] - argon2 hashing and verification

pub mod documents;
pub mod mailer;
pub mod notify;
pub mod orders;
pub mod password;
pub mod reporting;
