//! Login, registration and session lifecycle.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::backend::{self, BackendError, ClinicBackend};
use crate::db::{Database, DbError};
use crate::debounce::Debouncer;
use crate::forms::{looks_like_email, ValidationErrors};
use crate::models::{AuthToken, Credentials, EmailExists, Registration};
use crate::notify::Notifications;

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const EMAIL_EXISTS_PATH: &str = "auth/email-exists";

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid form: {0}")]
    Validation(ValidationErrors),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Token store error: {0}")]
    Store(#[from] DbError),
}

pub type AuthResult<T> = Result<T, AuthError>;

fn reject(errors: ValidationErrors, notices: &mut Notifications, now: DateTime<Utc>) -> AuthError {
    let message = errors
        .first_message()
        .unwrap_or_else(|| "Please review the form".to_string());
    notices.error(message, now);
    AuthError::Validation(errors)
}

/// Log in and store the returned token.
pub fn login<B: ClinicBackend + ?Sized>(
    backend: &B,
    store: &Database,
    credentials: &Credentials,
    notices: &mut Notifications,
    now: DateTime<Utc>,
) -> AuthResult<AuthToken> {
    if let Err(errors) = credentials.validate() {
        return Err(reject(errors, notices, now));
    }

    let body = serde_json::to_value(credentials).map_err(BackendError::from)?;
    let mut token: AuthToken = match backend.post(LOGIN_PATH, &body).and_then(backend::decode::<AuthToken>) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(username = %credentials.username, error = %e, "Login failed");
            notices.error(e.user_message(), now);
            return Err(e.into());
        }
    };
    token.issued_at.get_or_insert(now);
    token
        .username
        .get_or_insert_with(|| credentials.username.clone());

    store.save_token(&token)?;
    tracing::info!(username = %credentials.username, "Logged in");
    notices.success("Welcome", now);
    Ok(token)
}

/// Create an account. Does not log in.
pub fn register<B: ClinicBackend + ?Sized>(
    backend: &B,
    registration: &Registration,
    notices: &mut Notifications,
    now: DateTime<Utc>,
) -> AuthResult<()> {
    let mut candidate = registration.clone();
    candidate.normalize();
    if let Err(errors) = candidate.validate() {
        return Err(reject(errors, notices, now));
    }

    let body = serde_json::to_value(&candidate).map_err(BackendError::from)?;
    if let Err(e) = backend.post(REGISTER_PATH, &body) {
        tracing::warn!(email = %candidate.email, error = %e, "Registration failed");
        notices.error(e.user_message(), now);
        return Err(e.into());
    }
    tracing::info!(email = %candidate.email, "Account registered");
    notices.success("Account created, you can now log in", now);
    Ok(())
}

/// Forget the stored session.
pub fn logout(store: &Database) -> AuthResult<()> {
    store.clear_tokens()?;
    tracing::info!("Logged out");
    Ok(())
}

/// Stored token, unless it has expired.
pub fn restore_session(store: &Database, now: DateTime<Utc>) -> AuthResult<Option<AuthToken>> {
    match store.current_token()? {
        Some(token) if token.is_expired(now) => {
            tracing::info!(username = ?token.username, "Stored session expired");
            store.clear_tokens()?;
            Ok(None)
        }
        other => Ok(other),
    }
}

/// Outcome of the registration email check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStatus {
    /// Nothing typed, or the check failed
    Unknown,
    /// Not shaped like an address; no request is made
    Invalid,
    /// Waiting for the debounce delay
    Pending,
    Available,
    Taken,
}

/// Debounced `auth/email-exists` lookup for the register form.
#[derive(Debug, Clone)]
pub struct EmailAvailability {
    debouncer: Debouncer<String>,
    status: EmailStatus,
    checked: Option<String>,
}

impl Default for EmailAvailability {
    fn default() -> Self {
        Self {
            debouncer: Debouncer::default(),
            status: EmailStatus::Unknown,
            checked: None,
        }
    }
}

impl EmailAvailability {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            ..Self::default()
        }
    }

    pub fn status(&self) -> EmailStatus {
        self.status
    }

    /// Email the current status refers to.
    pub fn checked_email(&self) -> Option<&str> {
        self.checked.as_deref()
    }

    /// Keystroke in the email field.
    pub fn input(&mut self, email: &str, now: DateTime<Utc>) {
        let email = email.trim().to_lowercase();
        self.checked = None;
        if email.is_empty() {
            self.debouncer.cancel();
            self.status = EmailStatus::Unknown;
        } else if !looks_like_email(&email) {
            self.debouncer.cancel();
            self.status = EmailStatus::Invalid;
        } else {
            self.debouncer.input(email, now);
            self.status = EmailStatus::Pending;
        }
    }

    /// Run the lookup once the delay has elapsed. Returns the new status
    /// when a request was made.
    pub fn poll<B: ClinicBackend + ?Sized>(&mut self, backend: &B, now: DateTime<Utc>) -> Option<EmailStatus> {
        let email = self.debouncer.poll(now)?;
        self.status = match backend.get(EMAIL_EXISTS_PATH, &[("email", &email)]).and_then(decode_exists) {
            Ok(true) => EmailStatus::Taken,
            Ok(false) => EmailStatus::Available,
            Err(e) => {
                tracing::warn!(error = %e, "Email availability check failed");
                EmailStatus::Unknown
            }
        };
        self.checked = Some(email);
        Some(self.status)
    }
}

/// Accepts `{"exists": bool}`, `{"taken": bool}` or a bare boolean.
fn decode_exists(value: Value) -> Result<bool, BackendError> {
    match backend::unwrap_envelope(value) {
        Value::Bool(taken) => Ok(taken),
        other => Ok(backend::decode::<EmailExists>(other)?.taken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Method, MockBackend};
    use serde_json::json;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_login_stores_token() {
        let backend = MockBackend::new();
        backend.respond(Method::Post, LOGIN_PATH, json!({"access": "tok", "refresh": "ref"}));
        let store = Database::open_in_memory().unwrap();
        let mut notices = Notifications::new();

        let token = login(&backend, &store, &Credentials::new("dr.lopez", "secret"), &mut notices, at(0)).unwrap();
        assert_eq!(token.token, "tok");
        assert_eq!(token.username.as_deref(), Some("dr.lopez"));
        assert_eq!(token.issued_at, Some(at(0)));

        let stored = store.current_token().unwrap().unwrap();
        assert_eq!(stored.token, "tok");
    }

    #[test]
    fn test_login_requires_fields_without_request() {
        let backend = MockBackend::new();
        let store = Database::open_in_memory().unwrap();
        let mut notices = Notifications::new();

        let result = login(&backend, &store, &Credentials::new("", "x"), &mut notices, at(0));
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert!(backend.calls().is_empty());
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_failed_login_keeps_previous_session() {
        let backend = MockBackend::new();
        backend.fail_next(BackendError::from_status(401, r#"{"detail": "Invalid credentials"}"#));
        let store = Database::open_in_memory().unwrap();
        store.save_token(&AuthToken::new("old")).unwrap();
        let mut notices = Notifications::new();

        let result = login(&backend, &store, &Credentials::new("a", "b"), &mut notices, at(0));
        assert!(matches!(result, Err(AuthError::Backend(_))));
        assert_eq!(notices.latest().unwrap().message, "Invalid credentials");
        assert_eq!(store.current_token().unwrap().unwrap().token, "old");
    }

    #[test]
    fn test_register_posts_normalized_payload() {
        let backend = MockBackend::new();
        backend.respond(Method::Post, REGISTER_PATH, json!({"ok": true}));
        let mut notices = Notifications::new();
        let registration = Registration {
            name: "Dr. López".into(),
            email: " Lopez@Clinic.com ".into(),
            password: "secret1".into(),
            password_confirmation: "secret1".into(),
        };

        register(&backend, &registration, &mut notices, at(0)).unwrap();
        let calls = backend.calls();
        let body = calls[0].body.as_ref().unwrap();
        assert_eq!(body["email"], "lopez@clinic.com");
        assert!(body.get("password_confirmation").is_none());
    }

    #[test]
    fn test_logout_and_expired_session() {
        let store = Database::open_in_memory().unwrap();
        let mut token = AuthToken::new("tok");
        token.expires_at = Some(at(1_000));
        store.save_token(&token).unwrap();

        assert!(restore_session(&store, at(0)).unwrap().is_some());
        assert!(restore_session(&store, at(1_000)).unwrap().is_none());
        assert!(store.current_token().unwrap().is_none());

        store.save_token(&AuthToken::new("tok")).unwrap();
        logout(&store).unwrap();
        assert!(restore_session(&store, at(0)).unwrap().is_none());
    }

    #[test]
    fn test_email_check_is_debounced() {
        let backend = MockBackend::new();
        backend.respond(
            Method::Get,
            "auth/email-exists?email=ana@clinic.com",
            json!({"exists": true}),
        );
        let mut check = EmailAvailability::default();

        check.input("a@c", at(0));
        assert_eq!(check.status(), EmailStatus::Invalid);
        check.input("ana@clinic.co", at(100));
        check.input("ana@clinic.com", at(300));
        assert_eq!(check.status(), EmailStatus::Pending);

        assert_eq!(check.poll(&backend, at(700)), None);
        assert_eq!(check.poll(&backend, at(800)), Some(EmailStatus::Taken));
        assert_eq!(check.checked_email(), Some("ana@clinic.com"));
        assert_eq!(check.poll(&backend, at(900)), None);
        assert_eq!(backend.count(Method::Get, EMAIL_EXISTS_PATH), 1);
    }

    #[test]
    fn test_email_check_failure_is_unknown() {
        let backend = MockBackend::new();
        let mut check = EmailAvailability::with_delay(Duration::milliseconds(10));
        check.input("free@clinic.com", at(0));
        // Unrouted path: the mock answers 404
        assert_eq!(check.poll(&backend, at(10)), Some(EmailStatus::Unknown));

        backend.respond(Method::Get, "auth/email-exists?email=free@clinic.com", json!(false));
        check.input("free@clinic.com", at(20));
        assert_eq!(check.poll(&backend, at(30)), Some(EmailStatus::Available));
    }
}
