//! Tabbed shell shown after login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthResult};
use crate::db::Database;
use crate::models::AuthToken;

/// Dashboard tabs, in menu order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Patients,
    Agenda,
    ClinicalHistory,
    Diagnosis,
    TreatmentPlan,
    Odontogram,
    Periodontogram,
    Periodontics,
    Budget,
    Finances,
}

impl Tab {
    pub const ALL: [Tab; 10] = [
        Tab::Patients,
        Tab::Agenda,
        Tab::ClinicalHistory,
        Tab::Diagnosis,
        Tab::TreatmentPlan,
        Tab::Odontogram,
        Tab::Periodontogram,
        Tab::Periodontics,
        Tab::Budget,
        Tab::Finances,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Patients => "Patients",
            Tab::Agenda => "Agenda",
            Tab::ClinicalHistory => "Clinical history",
            Tab::Diagnosis => "Diagnosis & prognosis",
            Tab::TreatmentPlan => "Treatment plan",
            Tab::Odontogram => "Odontogram",
            Tab::Periodontogram => "Periodontogram",
            Tab::Periodontics => "Periodontics",
            Tab::Budget => "Budget",
            Tab::Finances => "Finances",
        }
    }

    /// Backend collection the tab works on.
    pub fn collection(self) -> &'static str {
        match self {
            Tab::Patients => "patients",
            Tab::Agenda => "appointments",
            Tab::ClinicalHistory => "clinical-histories",
            Tab::Diagnosis => "diagnoses",
            Tab::TreatmentPlan => "treatment-plans",
            Tab::Odontogram => "odontograms",
            Tab::Periodontogram => "periodontograms",
            Tab::Periodontics => "periodontics",
            Tab::Budget => "budgets",
            Tab::Finances => "finances",
        }
    }

    /// Tabs that show one patient's records.
    pub fn needs_patient(self) -> bool {
        !matches!(self, Tab::Patients | Tab::Agenda | Tab::Finances)
    }
}

/// Session plus navigation state.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    session: Option<AuthToken>,
    active: Tab,
    patient_id: Option<String>,
}

impl Dashboard {
    /// Resume from the token store.
    pub fn restore(store: &Database, now: DateTime<Utc>) -> AuthResult<Self> {
        Ok(Self {
            session: auth::restore_session(store, now)?,
            ..Self::default()
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&AuthToken> {
        self.session.as_ref()
    }

    /// Enter the dashboard after a successful login.
    pub fn start_session(&mut self, token: AuthToken) {
        self.session = Some(token);
        self.active = Tab::default();
        self.patient_id = None;
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    /// Switch tabs. Ignored while logged out.
    pub fn select(&mut self, tab: Tab) -> bool {
        if !self.is_logged_in() {
            return false;
        }
        if self.active != tab {
            tracing::debug!(from = ?self.active, to = ?tab, "Tab changed");
            self.active = tab;
        }
        true
    }

    /// Patient whose records the per-patient tabs show.
    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn select_patient(&mut self, patient_id: impl Into<String>) {
        self.patient_id = Some(patient_id.into());
    }

    /// The active tab can render: either it needs no patient or one is chosen.
    pub fn is_ready(&self) -> bool {
        self.is_logged_in() && (!self.active.needs_patient() || self.patient_id.is_some())
    }

    /// Clear the stored token and return to the logged-out state.
    pub fn logout(&mut self, store: &Database) -> AuthResult<()> {
        auth::logout(store)?;
        *self = Self::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_tabs_are_distinct() {
        let mut collections: Vec<_> = Tab::ALL.iter().map(|t| t.collection()).collect();
        collections.sort();
        collections.dedup();
        assert_eq!(collections.len(), Tab::ALL.len());
    }

    #[test]
    fn test_restore_without_token_is_logged_out() {
        let store = Database::open_in_memory().unwrap();
        let mut dashboard = Dashboard::restore(&store, now()).unwrap();
        assert!(!dashboard.is_logged_in());
        assert!(!dashboard.select(Tab::Agenda));
        assert_eq!(dashboard.active_tab(), Tab::Patients);
    }

    #[test]
    fn test_select_and_logout() {
        let store = Database::open_in_memory().unwrap();
        store.save_token(&AuthToken::new("tok")).unwrap();

        let mut dashboard = Dashboard::restore(&store, now()).unwrap();
        assert!(dashboard.is_logged_in());
        assert!(dashboard.select(Tab::Odontogram));
        assert!(!dashboard.is_ready());
        dashboard.select_patient("12");
        assert!(dashboard.is_ready());

        dashboard.logout(&store).unwrap();
        assert!(!dashboard.is_logged_in());
        assert_eq!(dashboard.active_tab(), Tab::Patients);
        assert!(dashboard.patient_id().is_none());
        assert!(store.current_token().unwrap().is_none());
    }
}
