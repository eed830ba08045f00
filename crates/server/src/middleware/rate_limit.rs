//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Two limiter profiles:
//! - `login_rate_limiter`: strict limits for the login endpoints
//!   (5 attempts per 15 minutes per client IP)
//! - `api_rate_limiter`: relaxed limits for the general API (~100/min)

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that reads the client IP from common proxy headers.
///
/// Falls back to loopback when no header is present (direct local access,
/// in-process tests), which keys all such traffic together - the same
/// behavior the limiter had behind a single reverse proxy.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the login rate limiter: 5 attempts per 15 minutes per IP.
///
/// Configuration: 1 token every 180 seconds (replenish), burst of 5.
/// This blocks credential brute forcing on the login endpoints.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(180)` and `burst_size(5)`), which are always
/// accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(180) // Replenish 1 token every 180 seconds (5 per 15 minutes)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(180) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create the general API rate limiter: ~100 requests per minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 100.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(100)`), which are always
/// accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(1)
        .burst_size(100)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(100) is valid");
    GovernorLayer::new(Arc::new(config))
}
