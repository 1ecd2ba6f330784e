use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::weather::models::WeatherArchive;

/// Client for an Open-Meteo compatible historical weather archive.
pub struct WeatherClient {
    http_client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

impl WeatherClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create weather HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            latitude: config.weather_latitude,
            longitude: config.weather_longitude,
            timezone: config.weather_timezone.clone(),
        })
    }

    /// Daily maximum temperature and daylight duration between two dates (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the request fails, returns an error status
    /// or the response cannot be parsed. Callers treat weather as optional.
    pub async fn get_daily(&self, start: NaiveDate, end: NaiveDate) -> AppResult<WeatherArchive> {
        let url = format!(
            "{}/archive?latitude={}&longitude={}&start_date={}&end_date={}&daily=temperature_2m_max,daylight_duration&timezone={}",
            self.base_url,
            self.latitude,
            self.longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            urlencoding::encode(&self.timezone)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Weather request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Weather API HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse weather response: {e}")))
    }
}
