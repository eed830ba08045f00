//! Order fulfillment status.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// The stored status string was not one of the known set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct StatusParseError(pub String);

/// Order fulfillment status.
///
/// Orders progress `received → preparing → shipped → arrived`, with
/// `cancelled` reachable from any state. Transitions are admin-driven and
/// unconstrained beyond membership in this set.
///
/// `processing` is a legacy alias still present in older rows; it is kept
/// as stored and folded into `received` only via [`OrderStatus::normalized`]
/// when building progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Received,
    Preparing,
    Shipped,
    Arrived,
    Cancelled,
    /// Legacy alias for `Received`; preserved in storage.
    Processing,
}

impl OrderStatus {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Preparing => "preparing",
            Self::Shipped => "shipped",
            Self::Arrived => "arrived",
            Self::Cancelled => "cancelled",
            Self::Processing => "processing",
        }
    }

    /// Fold the legacy alias into its modern equivalent.
    ///
    /// Only for presentation (progress display); the stored value is
    /// never rewritten.
    #[must_use]
    pub const fn normalized(self) -> Self {
        match self {
            Self::Processing => Self::Received,
            other => other,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "preparing" => Ok(Self::Preparing),
            "shipped" => Ok(Self::Shipped),
            "arrived" => Ok(Self::Arrived),
            "cancelled" => Ok(Self::Cancelled),
            "processing" => Ok(Self::Processing),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_statuses() {
        for status in [
            OrderStatus::Received,
            OrderStatus::Preparing,
            OrderStatus::Shipped,
            OrderStatus::Arrived,
            OrderStatus::Cancelled,
            OrderStatus::Processing,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("refunded".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_legacy_alias_normalizes_to_received() {
        assert_eq!(
            OrderStatus::Processing.normalized(),
            OrderStatus::Received
        );
        // Normalization never touches the other states.
        assert_eq!(OrderStatus::Shipped.normalized(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::Cancelled.normalized(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let back: OrderStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(back, OrderStatus::Processing);
    }
}
