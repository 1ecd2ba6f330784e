use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::identity::{IdentityUser, NewUser};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<IdentityUser> for UserResponse {
    fn from(user: IdentityUser) -> Self {
        let email = user.primary_email().map(str::to_string);
        let millis = |ms: Option<i64>| ms.and_then(DateTime::<Utc>::from_timestamp_millis);

        Self {
            created_at: millis(user.created_at),
            last_sign_in_at: millis(user.last_sign_in_at),
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email,
            image_url: user.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub items: Vec<UserResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUserResponse {
    pub id: String,
    pub deleted: bool,
}

/// Body of `POST /api/users`. Fields are optional here so that missing
/// values produce a 400 with a clear message instead of a generic rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CreateUserRequest {
    /// Check required fields and build the identity-provider payload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` naming the first invalid field.
    pub fn validate(self) -> AppResult<NewUser> {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

        if !is_plausible_email(&email) {
            return Err(AppError::BadRequest("email is not a valid address".to_string()));
        }

        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("password is required".to_string()))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let name = |n: Option<String>| n.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(NewUser {
            email_address: vec![email],
            password,
            first_name: name(self.first_name),
            last_name: name(self.last_name),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, password: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
            first_name: Some("  Ana ".to_string()),
            last_name: Some(String::new()),
        }
    }

    #[test]
    fn valid_request_builds_payload() {
        let user = request(Some(" ana@example.com "), Some("correct horse"))
            .validate()
            .unwrap();

        assert_eq!(user.email_address, vec!["ana@example.com"]);
        assert_eq!(user.first_name.as_deref(), Some("Ana"));
        assert!(user.last_name.is_none());
    }

    #[test]
    fn rejects_missing_or_bad_fields() {
        for (email, password) in [
            (None, Some("longenough")),
            (Some("   "), Some("longenough")),
            (Some("not-an-email"), Some("longenough")),
            (Some("a@b"), Some("longenough")),
            (Some("a b@example.com"), Some("longenough")),
            (Some("ana@example.com"), None),
            (Some("ana@example.com"), Some("short")),
        ] {
            let result = request(email, password).validate();
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "expected 400 for {email:?}/{password:?}"
            );
        }
    }
}
