use serde::{Deserialize, Serialize};

/// User object returned by the identity provider's backend API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_sign_in_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

impl IdentityUser {
    /// The primary email address, falling back to the first one listed.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self
            .primary_email_address_id
            .as_deref()
            .and_then(|id| self.email_addresses.iter().find(|e| e.id == id));

        primary
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email_address: Vec<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletedObject {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Error envelope: `{"errors": [{"message": "...", "long_message": "..."}]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub long_message: Option<String>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .errors
            .iter()
            .map(|e| e.long_message.as_deref().unwrap_or(&e.message))
            .filter(|m| !m.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_email_prefers_flagged_address() {
        let user: IdentityUser = serde_json::from_str(
            r#"{
                "id": "user_1",
                "primary_email_address_id": "idn_2",
                "email_addresses": [
                    {"id": "idn_1", "email_address": "old@example.com"},
                    {"id": "idn_2", "email_address": "main@example.com"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(user.primary_email(), Some("main@example.com"));
    }

    #[test]
    fn primary_email_falls_back_to_first() {
        let user: IdentityUser = serde_json::from_str(
            r#"{"id": "user_1", "email_addresses": [{"id": "idn_1", "email_address": "a@example.com"}]}"#,
        )
        .unwrap();

        assert_eq!(user.primary_email(), Some("a@example.com"));
    }

    #[test]
    fn error_summary_joins_long_messages() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"errors": [
                {"message": "taken", "long_message": "That email address is taken."},
                {"message": "weak password"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            envelope.summary().as_deref(),
            Some("That email address is taken.; weak password")
        );
        assert!(ErrorEnvelope::default().summary().is_none());
    }
}
