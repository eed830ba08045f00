//! Canonical stored-timestamp format.
//!
//! Every timestamp in the database is written by the application in this
//! zero-padded UTC form, so lexicographic comparison on the stored column is
//! chronological comparison on both storage backends. The reporting engine's
//! month ranges depend on this.

use chrono::{DateTime, Utc};

/// `strftime` format of every stored timestamp: `YYYY-MM-DD HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format an instant in the canonical stored form.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The current instant in the canonical stored form.
#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
