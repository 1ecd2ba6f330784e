use std::env;
use std::str::FromStr;

use chrono::NaiveDate;
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

/// Key material used to verify identity-provider session tokens.
#[derive(Clone)]
pub enum JwtKey {
    /// RS256 public key in PEM format (what the identity provider publishes)
    RsaPem(String),
    /// HS256 shared secret
    Secret(String),
}

impl std::fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsaPem(_) => f.write_str("RsaPem(..)"),
            Self::Secret(_) => f.write_str("Secret(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Metering API
    pub metering_base_url: String,
    pub metering_api_key_header: String,
    pub metering_authorization: String,
    pub metering_timeout_seconds: u64,

    // Identity provider
    pub identity_base_url: String,
    pub identity_secret_key: String,
    pub auth_jwt_key: JwtKey,
    pub auth_jwt_issuer: Option<String>,

    // Sync settings
    pub sync_measuring_ids: Vec<String>,
    pub sync_epoch_date: NaiveDate,
    pub sync_timezone: Tz,

    // Weather enrichment
    pub weather_enabled: bool,
    pub weather_base_url: String,
    pub weather_latitude: f64,
    pub weather_longitude: f64,
    pub weather_timezone: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub cors_allowed_origins: Vec<String>,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_replenish_seconds: u64,
    pub rate_limit_burst: u32,
    pub rate_limit_sync_replenish_seconds: u64,
    pub rate_limit_sync_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let auth_jwt_key = match (var("AUTH_JWT_PUBLIC_KEY"), var("AUTH_JWT_SECRET")) {
            (Some(pem), _) => JwtKey::RsaPem(pem.replace("\\n", "\n")),
            (None, Some(secret)) => JwtKey::Secret(secret),
            (None, None) => return Err(ConfigError::Missing("AUTH_JWT_PUBLIC_KEY or AUTH_JWT_SECRET")),
        };

        let sync_measuring_ids: Vec<String> = or("SYNC_MEASURING_IDS", "857,856")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if sync_measuring_ids.is_empty() {
            return Err(ConfigError::Invalid("SYNC_MEASURING_IDS"));
        }

        let sync_epoch_date = NaiveDate::parse_from_str(&or("SYNC_EPOCH_DATE", "2024-01-01"), "%Y-%m-%d")
            .map_err(|_| ConfigError::Invalid("SYNC_EPOCH_DATE"))?;
        let sync_timezone = or("SYNC_TIMEZONE", "Europe/Ljubljana")
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid("SYNC_TIMEZONE"))?;

        Ok(Self {
            // Database
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,

            // Metering API
            metering_base_url: or("METERING_BASE_URL", "https://ps.ngen.si/api/1.0"),
            metering_api_key_header: or("METERING_API_KEY_HEADER", "Api383994619958244"),
            metering_authorization: or("METERING_AUTHORIZATION", "API383994619958244"),
            metering_timeout_seconds: parse_or(&var, "METERING_TIMEOUT_SECONDS", 60),

            // Identity provider
            identity_base_url: or("IDENTITY_BASE_URL", "https://api.clerk.com/v1"),
            identity_secret_key: var("IDENTITY_SECRET_KEY")
                .ok_or(ConfigError::Missing("IDENTITY_SECRET_KEY"))?,
            auth_jwt_key,
            auth_jwt_issuer: var("AUTH_JWT_ISSUER"),

            // Sync settings
            sync_measuring_ids,
            sync_epoch_date,
            sync_timezone,

            // Weather enrichment
            weather_enabled: parse_or(&var, "WEATHER_ENABLED", true),
            weather_base_url: or("WEATHER_BASE_URL", "https://archive-api.open-meteo.com/v1"),
            weather_latitude: parse_or(&var, "WEATHER_LATITUDE", 45.957_625_4),
            weather_longitude: parse_or(&var, "WEATHER_LONGITUDE", 14.653_185_4),
            weather_timezone: or("WEATHER_TIMEZONE", "Europe/Berlin"),

            // API settings
            api_host: or("API_HOST", "0.0.0.0"),
            api_port: parse_or(&var, "API_PORT", 8080),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            // Rate limiting
            disable_rate_limiting: parse_or(&var, "DISABLE_RATE_LIMITING", false),
            rate_limit_replenish_seconds: parse_or(&var, "RATE_LIMIT_REPLENISH_SECONDS", 1),
            rate_limit_burst: parse_or(&var, "RATE_LIMIT_BURST", 60),
            rate_limit_sync_replenish_seconds: parse_or(&var, "RATE_LIMIT_SYNC_REPLENISH_SECONDS", 30),
            rate_limit_sync_burst: parse_or(&var, "RATE_LIMIT_SYNC_BURST", 2),

            // Application metadata
            deployment: Deployment::from_str(&or("DEPLOYMENT", "local")),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Parse an optional variable, falling back to `default` when unset or unparseable.
fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
