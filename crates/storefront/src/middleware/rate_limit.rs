//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Checkout actions are cheap to call and each one hits the commerce API, so
//! they are limited per client IP:
//! - `promo_code_rate_limiter`: strict, to make guessing codes impractical
//! - `checkout_rate_limiter`: relaxed, for the remaining checkout actions

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use thiserror::Error;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Rate limiter settings were rejected by governor.
#[derive(Debug, Error)]
#[error("invalid rate limiter configuration: {0}")]
pub struct RateLimitConfigError(&'static str);

/// Key extractor reading the real client IP from proxy headers.
///
/// `x-forwarded-for` contributes its first (client-most) entry. Without any
/// proxy header the peer address is used, when the server records it.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn rate_limiter(
    replenish_seconds: u64,
    burst_size: u32,
    name: &'static str,
) -> Result<RateLimiterLayer, RateLimitConfigError> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst_size)
        .finish()
        .ok_or(RateLimitConfigError(name))?;
    Ok(GovernorLayer::new(Arc::new(config)))
}

/// Promo code endpoints: ~10 requests per minute per IP, burst of 5.
///
/// # Errors
///
/// Returns an error if governor rejects the quota.
pub fn promo_code_rate_limiter() -> Result<RateLimiterLayer, RateLimitConfigError> {
    rate_limiter(6, 5, "promo code")
}

/// Other checkout actions: ~60 requests per minute per IP, burst of 20.
///
/// # Errors
///
/// Returns an error if governor rejects the quota.
pub fn checkout_rate_limiter() -> Result<RateLimiterLayer, RateLimitConfigError> {
    rate_limiter(1, 20, "checkout")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let ip = client_ip(&headers(&[
            ("x-forwarded-for", "198.51.100.7"),
            ("cf-connecting-ip", "203.0.113.9"),
        ]));
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_forwarded_for_uses_first_entry() {
        let ip = client_ip(&headers(&[(
            "x-forwarded-for",
            "198.51.100.7, 10.0.0.1, 10.0.0.2",
        )]));
        assert_eq!(ip, Some("198.51.100.7".parse().unwrap()));
    }

    #[test]
    fn test_unparseable_header_falls_through() {
        let ip = client_ip(&headers(&[
            ("cf-connecting-ip", "unknown"),
            ("x-real-ip", "2001:db8::1"),
        ]));
        assert_eq!(ip, Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_limiters_build() {
        assert!(promo_code_rate_limiter().is_ok());
        assert!(checkout_rate_limiter().is_ok());
    }
}
