use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::identity::{IdentityClient, SessionVerifier};
use crate::metering::MeteringClient;
use crate::weather::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub metering_client: Arc<MeteringClient>,
    /// `None` when weather enrichment is disabled
    pub weather_client: Option<Arc<WeatherClient>>,
    pub identity_client: Arc<IdentityClient>,
    pub sessions: Arc<SessionVerifier>,
}

impl AppState {
    /// Build the HTTP clients and session verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be constructed or the session key is invalid.
    pub fn new(db: DatabaseConnection, config: Config) -> AppResult<Self> {
        let metering_client = MeteringClient::new(&config)?;
        let weather_client = if config.weather_enabled {
            Some(Arc::new(WeatherClient::new(&config)?))
        } else {
            None
        };
        let identity_client = IdentityClient::new(&config)?;
        let sessions = SessionVerifier::new(&config)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            metering_client: Arc::new(metering_client),
            weather_client,
            identity_client: Arc::new(identity_client),
            sessions: Arc::new(sessions),
        })
    }
}
