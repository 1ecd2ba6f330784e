use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::entity::measuring_points;
use crate::error::{AppError, AppResult};
use crate::metering::models::MeterReading;

pub struct MeteringClient {
    http_client: Client,
    base_url: String,
    api_key_header: String,
    authorization: String,
}

impl MeteringClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.metering_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create metering HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.metering_base_url.trim_end_matches('/').to_string(),
            api_key_header: config.metering_api_key_header.clone(),
            authorization: config.metering_authorization.clone(),
        })
    }

    /// Build the readings query URL for one measuring point.
    ///
    /// Both bounds are sent as quoted ISO timestamps, percent-encoded. The
    /// `date[gte]`/`date[lte]` brackets are left literal, which is what the API expects.
    #[must_use]
    pub fn readings_url(&self, measuring_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
        let quoted = |t: DateTime<Utc>| {
            let iso = t.to_rfc3339_opts(SecondsFormat::Millis, true);
            urlencoding::encode(&format!("\"{iso}\"")).into_owned()
        };

        format!(
            "{}/measuring_points.measurments_model?measuring_point_id={}&date[gte]={}&date[lte]={}",
            self.base_url,
            urlencoding::encode(measuring_id),
            quoted(from),
            quoted(to)
        )
    }

    /// Fetch daily readings for a measuring point between `from` and `to` (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::MeteringApi` if the request fails, returns an error
    /// status, or the body is not a JSON array of readings.
    pub async fn get_readings(
        &self,
        point: &measuring_points::Model,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<MeterReading>> {
        let url = self.readings_url(&point.measuring_id, from, to);

        tracing::debug!(
            measuring_id = %point.measuring_id,
            from = %from,
            to = %to,
            "Fetching metering readings"
        );

        let response = self
            .http_client
            .get(&url)
            .header("visitor_uuid", &point.point_uuid)
            .header("session_id", &point.point_id)
            .header(self.api_key_header.as_str(), &point.api_key)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| AppError::MeteringApi(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::MeteringApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::MeteringApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                measuring_id = %point.measuring_id,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse metering response"
            );
            AppError::MeteringApi(format!("Failed to parse response: {e}"))
        })
    }
}
