//! Register, login, dashboard and logout against an on-disk token store.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tempfile::TempDir;

use dental_clinic_core::auth::{self, AuthError, EmailAvailability, EmailStatus, LOGIN_PATH};
use dental_clinic_core::backend::{BackendError, Method, MockBackend};
use dental_clinic_core::dashboard::{Dashboard, Tab};
use dental_clinic_core::models::{Credentials, Registration};
use dental_clinic_core::notify::NoticeKind;
use dental_clinic_core::{AuthToken, Database, Notifications};

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(1_715_000_000_000 + ms).unwrap()
}

#[test]
fn test_session_survives_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.db");
    let backend = MockBackend::new();
    backend.respond(Method::Post, LOGIN_PATH, json!({"data": {"access_token": "tok-9", "refresh_token": "ref-9"}}));
    let mut notices = Notifications::new();

    {
        let store = Database::open(&path)?;
        let mut dashboard = Dashboard::restore(&store, at(0))?;
        assert!(!dashboard.is_logged_in());

        let token = auth::login(&backend, &store, &Credentials::new("dr.lopez", "secret"), &mut notices, at(0))?;
        dashboard.start_session(token);
        assert!(dashboard.select(Tab::Budget));
        assert_eq!(notices.latest().map(|n| n.kind), Some(NoticeKind::Success));
    }

    let store = Database::open(&path)?;
    let mut dashboard = Dashboard::restore(&store, at(60_000))?;
    assert!(dashboard.is_logged_in());
    assert_eq!(dashboard.session().map(|t| t.token.as_str()), Some("tok-9"));
    assert_eq!(dashboard.session().and_then(|t| t.refresh_token.as_deref()), Some("ref-9"));
    assert_eq!(dashboard.active_tab(), Tab::Patients);

    dashboard.logout(&store)?;
    assert!(!dashboard.is_logged_in());
    assert!(Database::open(&path)?.current_token()?.is_none());
    Ok(())
}

#[test]
fn test_expired_session_is_discarded() -> Result<()> {
    let store = Database::open_in_memory()?;
    let mut token = AuthToken::new("old");
    token.expires_at = Some(at(0));
    store.save_token(&token)?;

    let dashboard = Dashboard::restore(&store, at(1))?;
    assert!(!dashboard.is_logged_in());
    assert!(store.current_token()?.is_none());
    Ok(())
}

#[test]
fn test_rejected_login_keeps_previous_session() -> Result<()> {
    let store = Database::open_in_memory()?;
    store.save_token(&AuthToken::new("still-valid"))?;
    let backend = MockBackend::new();
    backend.fail_next(BackendError::from_status(401, r#"{"detail": "Invalid credentials"}"#));
    let mut notices = Notifications::new();

    let result = auth::login(&backend, &store, &Credentials::new("dr.lopez", "wrong"), &mut notices, at(0));

    assert!(matches!(result, Err(AuthError::Backend(_))));
    assert_eq!(notices.latest().map(|n| n.message.as_str()), Some("Invalid credentials"));
    assert_eq!(store.current_token()?.map(|t| t.token).as_deref(), Some("still-valid"));
    Ok(())
}

#[test]
fn test_register_with_debounced_email_check() -> Result<()> {
    let backend = MockBackend::new();
    backend.respond(Method::Get, "auth/email-exists?email=ana@clinic.com", json!({"exists": true}));
    backend.respond(Method::Get, "auth/email-exists?email=ana.p@clinic.com", json!(false));
    let mut notices = Notifications::new();
    let mut check = EmailAvailability::with_delay(Duration::milliseconds(500));

    // Typing fast only triggers one lookup, for the final value
    check.input("ana@", at(0));
    assert_eq!(check.status(), EmailStatus::Invalid);
    check.input("ana@clinic.co", at(100));
    check.input("Ana@clinic.com", at(200));
    assert_eq!(check.poll(&backend, at(600)), None);
    assert_eq!(check.poll(&backend, at(700)), Some(EmailStatus::Taken));
    assert_eq!(backend.count(Method::Get, "auth/email-exists"), 1);

    check.input("ana.p@clinic.com", at(1_000));
    assert_eq!(check.poll(&backend, at(1_500)), Some(EmailStatus::Available));
    assert_eq!(check.checked_email(), Some("ana.p@clinic.com"));

    let mut registration = Registration {
        name: "Ana Pérez".into(),
        email: "ana.p@clinic.com".into(),
        password: "secret".into(),
        password_confirmation: "secrets".into(),
    };
    let result = auth::register(&backend, &registration, &mut notices, at(2_000));
    assert!(matches!(result, Err(AuthError::Validation(_))));
    assert_eq!(backend.count(Method::Post, "auth/register"), 0);

    registration.password_confirmation = "secret".into();
    auth::register(&backend, &registration, &mut notices, at(2_000))?;
    let calls = backend.calls();
    let sent = calls
        .iter()
        .find(|c| c.method == Method::Post)
        .and_then(|c| c.body.clone())
        .unwrap();
    assert!(sent.get("password_confirmation").is_none());
    Ok(())
}
