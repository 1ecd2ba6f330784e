//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use chrono::Utc;
use energy_sync::config::Config;
use energy_sync::identity::SessionClaims;
use jsonwebtoken::{encode, EncodingKey, Header};

pub const SESSION_SECRET: &str = "integration-session-secret";

/// Configuration pointing every upstream at `upstream_url`, with extra
/// variables layered on top.
pub fn config(upstream_url: &str, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "postgres://localhost/energy_test".to_string()),
        ("IDENTITY_SECRET_KEY".to_string(), "sk_test_123".to_string()),
        ("IDENTITY_BASE_URL".to_string(), upstream_url.to_string()),
        ("METERING_BASE_URL".to_string(), upstream_url.to_string()),
        ("WEATHER_BASE_URL".to_string(), upstream_url.to_string()),
        ("AUTH_JWT_SECRET".to_string(), SESSION_SECRET.to_string()),
        ("SYNC_TIMEZONE".to_string(), "UTC".to_string()),
        ("DISABLE_RATE_LIMITING".to_string(), "true".to_string()),
    ]);
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    Config::from_lookup(move |key: &str| vars.get(key).cloned()).unwrap()
}

/// A valid session token for `user_id`.
pub fn session_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        sid: Some("sess_test".to_string()),
        exp: now + 600,
        iat: Some(now),
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .unwrap()
}
