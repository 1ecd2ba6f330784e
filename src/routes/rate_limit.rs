use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

use crate::identity::AuthUser;

/// Rate limit bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientKey {
    /// Verified session user
    User(String),
    Ip(IpAddr),
}

/// Keys rate limits by session user, falling back to client IP.
///
/// The session check runs before the limiter on `/api` routes, so a verified
/// [`AuthUser`] is normally present and spoofed forwarding headers cannot move
/// a caller into someone else's bucket. Without one, the IP comes from
/// `X-Forwarded-For` (first hop), `X-Real-IP`, then the socket peer. Requests
/// with no identifiable address share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientKeyExtractor;

impl KeyExtractor for ClientKeyExtractor {
    type Key = ClientKey;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return Ok(ClientKey::User(user.user_id.clone()));
        }

        let header_ip = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        let peer_ip = || {
            req.extensions()
                .get::<axum::extract::ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        };

        Ok(ClientKey::Ip(
            header_ip("x-forwarded-for")
                .or_else(|| header_ip("x-real-ip"))
                .or_else(peer_ip)
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        ))
    }
}
