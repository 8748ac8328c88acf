//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login and registration are limited per client IP to slow down password
//! guessing and account spam.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

/// Key extractor for the client's IP address.
///
/// Keys on the TCP peer. Proxy headers are read only when built with
/// [`ClientIpKeyExtractor::behind_proxy`].
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy: bool,
}

impl ClientIpKeyExtractor {
    /// Extractor that keys on the peer address only.
    #[must_use]
    pub const fn peer() -> Self {
        Self { trust_proxy: false }
    }

    /// Extractor that prefers `X-Forwarded-For`, then `X-Real-IP`.
    #[must_use]
    pub const fn behind_proxy() -> Self {
        Self { trust_proxy: true }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client address reported by a proxy.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // First hop in X-Forwarded-For is the original client
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints.
///
/// One request is replenished every 6 seconds, up to `config.burst`.
///
/// # Panics
///
/// Does not panic: the replenish period is positive and `RateLimitConfig`
/// burst sizes are validated as positive when loaded.
#[must_use]
pub fn auth_rate_limiter(config: RateLimitConfig) -> RateLimiterLayer {
    let key_extractor = if config.trust_proxy {
        ClientIpKeyExtractor::behind_proxy()
    } else {
        ClientIpKeyExtractor::peer()
    };
    let governor = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_second(6)
        .burst_size(config.burst.max(1))
        .finish()
        .expect("rate limiter config with a positive period and burst is valid");
    GovernorLayer::new(Arc::new(governor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn with_peer(mut req: Request<()>, peer: &str) -> Request<()> {
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let req = with_peer(
            request(&[
                ("x-forwarded-for", "203.0.113.7"),
                ("x-real-ip", "198.51.100.2"),
            ]),
            "192.0.2.9:51000",
        );
        assert_eq!(
            ClientIpKeyExtractor::peer().extract(&req).unwrap(),
            "192.0.2.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_forwarded_for_first_hop_behind_proxy() {
        let req = with_peer(
            request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]),
            "10.0.0.1:443",
        );
        assert_eq!(
            ClientIpKeyExtractor::behind_proxy().extract(&req).unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_real_ip_header_behind_proxy() {
        let req = request(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(
            ClientIpKeyExtractor::behind_proxy().extract(&req).unwrap(),
            "198.51.100.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_behind_proxy_falls_back_to_peer() {
        let req = with_peer(request(&[("x-forwarded-for", "garbage")]), "192.0.2.9:51000");
        assert_eq!(
            ClientIpKeyExtractor::behind_proxy().extract(&req).unwrap(),
            "192.0.2.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = request(&[("x-forwarded-for", "203.0.113.7")]);
        assert!(ClientIpKeyExtractor::peer().extract(&req).is_err());
        assert!(ClientIpKeyExtractor::behind_proxy().extract(&request(&[])).is_err());
    }
}
