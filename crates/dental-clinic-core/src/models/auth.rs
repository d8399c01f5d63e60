//! Authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forms::{ValidationErrors, Validator};

/// Minimum password length accepted by the register form.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Login form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("username", &self.username)
            .require("password", &self.password)
            .finish()
    }
}

/// Register form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Client-side only
    #[serde(skip)]
    pub password_confirmation: String,
}

impl Registration {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("name", &self.name)
            .require("email", &self.email)
            .email("email", &self.email)
            .min_len("password", &self.password, PASSWORD_MIN_LEN)
            .check(
                self.password == self.password_confirmation,
                "password_confirmation",
                "Passwords do not match",
            )
            .finish()
    }
}

/// Token pair returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    #[serde(alias = "access", alias = "access_token")]
    pub token: String,
    #[serde(default, alias = "refresh", alias = "refresh_token")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            username: None,
            issued_at: None,
            expires_at: None,
        }
    }

    /// Tokens without an expiry never expire client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Response of `auth/email-exists`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailExists {
    #[serde(alias = "exists")]
    pub taken: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        let errors = Credentials::new("", "").validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
        assert!(Credentials::new("dr.lopez", "secret").validate().is_ok());
    }

    #[test]
    fn test_registration_rules() {
        let mut registration = Registration {
            name: " Dr. López ".into(),
            email: " LOPEZ@Clinic.com".into(),
            password: "abc".into(),
            password_confirmation: "abd".into(),
        };
        registration.normalize();
        assert_eq!(registration.email, "lopez@clinic.com");

        let errors = registration.validate().unwrap_err();
        assert!(errors.has("password"));
        assert!(errors.has("password_confirmation"));
        assert!(!errors.has("email"));

        registration.password = "abcdef".into();
        registration.password_confirmation = "abcdef".into();
        assert!(registration.validate().is_ok());
    }

    #[test]
    fn test_confirmation_not_sent() {
        let registration = Registration {
            password_confirmation: "x".into(),
            ..Registration::default()
        };
        let json = serde_json::to_value(&registration).unwrap();
        assert!(json.get("password_confirmation").is_none());
    }

    #[test]
    fn test_token_aliases() {
        let token: AuthToken =
            serde_json::from_str(r#"{"access": "abc", "refresh": "def"}"#).unwrap();
        assert_eq!(token.token, "abc");
        assert_eq!(token.refresh_token.as_deref(), Some("def"));
        assert_eq!(token.bearer(), "Bearer abc");
    }

    #[test]
    fn test_token_expiry() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut token = AuthToken::new("abc");
        assert!(!token.is_expired(now));
        token.expires_at = Some(now);
        assert!(token.is_expired(now));
    }
}
