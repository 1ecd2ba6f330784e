use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::models::{DeletedObject, ErrorEnvelope, IdentityUser, NewUser, TotalCount};

/// Backend API client for the user directory.
pub struct IdentityClient {
    http_client: Client,
    base_url: String,
    secret_key: String,
}

impl IdentityClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create identity HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            secret_key: config.identity_secret_key.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown user, `AppError::IdentityApi` otherwise.
    pub async fn get_user(&self, user_id: &str) -> AppResult<IdentityUser> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));
        let response = self.send(self.http_client.get(&url)).await?;
        parse(check(response, user_id).await?).await
    }

    /// Users ordered newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::IdentityApi` if the request fails.
    pub async fn list_users(&self, limit: u64, offset: u64) -> AppResult<Vec<IdentityUser>> {
        let url = format!(
            "{}/users?limit={limit}&offset={offset}&order_by=-created_at",
            self.base_url
        );
        let response = self.send(self.http_client.get(&url)).await?;
        parse(check(response, "users").await?).await
    }

    /// # Errors
    ///
    /// Returns `AppError::IdentityApi` if the request fails.
    pub async fn count_users(&self) -> AppResult<u64> {
        let url = format!("{}/users/count", self.base_url);
        let response = self.send(self.http_client.get(&url)).await?;
        let count: TotalCount = parse(check(response, "users").await?).await?;
        Ok(count.total_count)
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the provider rejects the payload
    /// (e.g. email already taken), `AppError::IdentityApi` otherwise.
    pub async fn create_user(&self, user: &NewUser) -> AppResult<IdentityUser> {
        let url = format!("{}/users", self.base_url);
        let response = self.send(self.http_client.post(&url).json(user)).await?;
        parse(check(response, "users").await?).await
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown user, `AppError::IdentityApi` otherwise.
    pub async fn delete_user(&self, user_id: &str) -> AppResult<String> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));
        let response = self.send(self.http_client.delete(&url)).await?;
        let deleted: DeletedObject = parse(check(response, user_id).await?).await?;

        if !deleted.deleted {
            return Err(AppError::IdentityApi(format!(
                "User '{}' was not deleted",
                deleted.id
            )));
        }
        Ok(deleted.id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AppResult<Response> {
        request
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(format!("Request failed: {e}")))
    }
}

/// Map provider status codes onto `AppError`.
async fn check(response: Response, subject: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.summary());

    match status {
        StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("'{subject}' not found"))),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(AppError::BadRequest(
            message.unwrap_or_else(|| "Rejected by identity provider".to_string()),
        )),
        _ => Err(AppError::IdentityApi(format!(
            "HTTP {status}: {}",
            message.unwrap_or(body)
        ))),
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    response
        .json()
        .await
        .map_err(|e| AppError::IdentityApi(format!("Failed to parse response: {e}")))
}
