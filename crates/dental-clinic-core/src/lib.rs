//! Dental Clinic Core Library
//!
//! Client core of the clinic administration app: typed records, form
//! controllers, the odontogram / periodontogram state machine and the REST
//! plumbing every screen sits on.
//!
//! # Architecture
//!
//! ```text
//!   UI shell (web / native)                   UniFFI facade (ClinicCore)
//!          │                                           │
//!          ▼                                           ▼
//!   ┌──────────────┬──────────────┬──────────────┬──────────────┐
//!   │  dashboard   │    forms     │    agenda    │    chart     │
//!   │  auth        │  (validate,  │ (modal CRUD, │ (select ──►  │
//!   │              │   submit)    │  calendar)   │  apply, save)│
//!   └──────┬───────┴──────┬───────┴──────┬───────┴──────┬───────┘
//!          │              │  ClinicBackend (JSON)       │
//!          ▼              ▼              ▼              ▼
//!     db (token)     MockBackend    dental-clinic-http (reqwest)
//! ```
//!
//! Handlers are synchronous and single-threaded: every call that talks to
//! the backend blocks until the response arrives, and timers (banners,
//! debounce) are driven by an explicit `now`.
//!
//! # Modules
//!
//! - [`models`]: Backend resources (Patient, Appointment, Budget, ...)
//! - [`forms`]: Draft / validate / create-or-update cycle
//! - [`chart`]: Tooth charts and their persistence
//! - [`agenda`]: Appointment book
//! - [`auth`], [`dashboard`]: Session and navigation
//! - [`backend`]: REST seam and in-memory mock
//! - [`export`]: Financial summary and budget statements
//! - [`db`]: SQLite token store

pub mod agenda;
pub mod auth;
pub mod backend;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod debounce;
pub mod export;
pub mod forms;
pub mod models;
pub mod notify;
pub mod search;

// Re-export commonly used types
pub use backend::{BackendError, ClinicBackend, MockBackend, Resource};
pub use chart::{
    ChartError, ChartModel, Condition, Odontogram, Periodontogram, Surface, ToothNumber,
};
pub use config::ClinicConfig;
pub use db::Database;
pub use forms::{FormController, FormModel, SubmitOutcome, ValidationErrors};
pub use models::{
    Appointment, AuthToken, Budget, ClinicalHistory, Diagnosis, FinancialRecord, Patient,
    PeriodonticsRecord, TreatmentPlan,
};
pub use notify::Notifications;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chart::{AbsentTeeth, OdontogramDocument, PeriodontogramDocument};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Chart error: {0}")]
    ChartError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        ClinicError::DatabaseError(e.to_string())
    }
}

impl From<chart::ChartError> for ClinicError {
    fn from(e: chart::ChartError) -> Self {
        ClinicError::ChartError(e.to_string())
    }
}

impl From<forms::ValidationErrors> for ClinicError {
    fn from(e: forms::ValidationErrors) -> Self {
        ClinicError::InvalidInput(e.first_message().unwrap_or_else(|| e.to_string()))
    }
}

impl From<backend::BackendError> for ClinicError {
    fn from(e: backend::BackendError) -> Self {
        ClinicError::BackendError(e.user_message())
    }
}

impl From<auth::AuthError> for ClinicError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::Validation(errors) => errors.into(),
            auth::AuthError::Backend(e) => e.into(),
            auth::AuthError::Store(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the token store at the given path.
#[uniffi::export]
pub fn open_clinic(path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(ClinicCore::new(db)))
}

/// Open with an in-memory token store (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicCore::new(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

#[derive(Default)]
struct OpenCharts {
    odontograms: HashMap<String, Odontogram>,
    periodontograms: HashMap<String, Periodontogram>,
}

/// Thread-safe facade for a foreign UI shell.
///
/// The shell performs HTTP itself and hands chart documents in and out as
/// JSON strings; charts are keyed by patient id.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    db: Arc<Mutex<Database>>,
    charts: Mutex<OpenCharts>,
}

impl ClinicCore {
    fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            charts: Mutex::new(OpenCharts::default()),
        }
    }
}

fn tooth(number: u8) -> Result<ToothNumber, ClinicError> {
    Ok(ToothNumber::new(number)?)
}

fn surface(name: &str) -> Result<Surface, ClinicError> {
    Ok(name.parse::<Surface>()?)
}

fn absent_set(numbers: Vec<u8>) -> Result<AbsentTeeth, ClinicError> {
    numbers.into_iter().map(tooth).collect()
}

fn not_open(patient_id: &str) -> ClinicError {
    ClinicError::NotFound(format!("No chart open for patient {}", patient_id))
}

fn same_patient(expected: &str, document_patient: &str) -> Result<(), ClinicError> {
    if expected == document_patient {
        Ok(())
    } else {
        Err(ClinicError::InvalidInput(format!(
            "Chart belongs to patient {}, not {}",
            document_patient, expected
        )))
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Session
    // =========================================================================

    /// Store the token returned by the login endpoint.
    pub fn save_token(&self, token: FfiAuthToken) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        db.save_token(&token.into())?;
        Ok(())
    }

    /// The stored session, if any and not expired.
    pub fn current_token(&self) -> Result<Option<FfiAuthToken>, ClinicError> {
        let db = self.db.lock()?;
        let token = auth::restore_session(&db, chrono::Utc::now())?;
        Ok(token.map(|t| t.into()))
    }

    pub fn logout(&self) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        auth::logout(&db)?;
        *self.charts.lock()? = OpenCharts::default();
        Ok(())
    }

    /// Drop both open charts of a patient. Returns whether any was open.
    pub fn close_chart(&self, patient_id: String) -> Result<bool, ClinicError> {
        let mut charts = self.charts.lock()?;
        let odontogram = charts.odontograms.remove(&patient_id).is_some();
        let periodontogram = charts.periodontograms.remove(&patient_id).is_some();
        tracing::debug!(%patient_id, odontogram, periodontogram, "Charts closed");
        Ok(odontogram || periodontogram)
    }

    // =========================================================================
    // Odontogram
    // =========================================================================

    /// Open a patient's odontogram from the stored document (if any) and the
    /// teeth marked absent on the periodontogram.
    pub fn open_odontogram(
        &self,
        patient_id: String,
        stored_json: Option<String>,
        companion_absent: Vec<u8>,
    ) -> Result<FfiChartState, ClinicError> {
        let companion = absent_set(companion_absent)?;
        let mut chart = match stored_json {
            Some(json) => {
                let document: OdontogramDocument = serde_json::from_str(&json)?;
                same_patient(&patient_id, &document.patient_id)?;
                Odontogram::from_document(document, None)
            }
            None => Odontogram::new(patient_id.clone()),
        };
        chart.merge_absent(&companion);
        let state = FfiChartState::of(&chart);
        self.charts.lock()?.odontograms.insert(patient_id, chart);
        Ok(state)
    }

    /// Surfaces of one tooth with their current condition.
    pub fn odontogram_tooth(&self, patient_id: String, tooth_number: u8) -> Result<Vec<FfiSurfaceCondition>, ClinicError> {
        let t = tooth(tooth_number)?;
        let charts = self.charts.lock()?;
        let chart = charts.odontograms.get(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        Ok(chart
            .editable_surfaces(t)
            .into_iter()
            .map(|s| FfiSurfaceCondition {
                surface: s.as_str().to_string(),
                label: s.label_for(t).to_string(),
                condition: chart.condition(t, s).unwrap_or_default().as_str().to_string(),
            })
            .collect())
    }

    pub fn select_odontogram_surface(&self, patient_id: String, tooth_number: u8, surface_name: String) -> Result<(), ClinicError> {
        let (t, s) = (tooth(tooth_number)?, surface(&surface_name)?);
        let mut charts = self.charts.lock()?;
        let chart = charts.odontograms.get_mut(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        chart.select_surface(t, s)?;
        Ok(())
    }

    /// Apply a condition to the selected surface.
    pub fn apply_condition(&self, patient_id: String, condition: String) -> Result<FfiSelection, ClinicError> {
        let condition: Condition = condition.parse()?;
        let mut charts = self.charts.lock()?;
        let chart = charts.odontograms.get_mut(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.apply_condition(condition)?.into())
    }

    pub fn toggle_odontogram_absent(&self, patient_id: String, tooth_number: u8) -> Result<bool, ClinicError> {
        let t = tooth(tooth_number)?;
        let mut charts = self.charts.lock()?;
        let chart = charts.odontograms.get_mut(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.toggle_absent(t))
    }

    pub fn set_odontogram_observations(&self, patient_id: String, text: String) -> Result<(), ClinicError> {
        let mut charts = self.charts.lock()?;
        let chart = charts.odontograms.get_mut(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        chart.set_observations(text);
        Ok(())
    }

    /// Document to send on save.
    pub fn odontogram_json(&self, patient_id: String) -> Result<String, ClinicError> {
        let charts = self.charts.lock()?;
        let chart = charts.odontograms.get(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        Ok(serde_json::to_string(&chart.to_document())?)
    }

    /// Replace local state with the server echo of a successful save.
    pub fn accept_odontogram_echo(&self, patient_id: String, echo_json: String) -> Result<FfiChartState, ClinicError> {
        let document: OdontogramDocument = serde_json::from_str(&echo_json)?;
        same_patient(&patient_id, &document.patient_id)?;
        let mut charts = self.charts.lock()?;
        let chart = charts.odontograms.get_mut(&patient_id).ok_or_else(|| not_open(&patient_id))?;
        chart.replace_with(document);
        Ok(FfiChartState::of(chart))
    }

    // =========================================================================
    // Periodontogram
    // =========================================================================

    pub fn open_periodontogram(
        &self,
        patient_id: String,
        stored_json: Option<String>,
        companion_absent: Vec<u8>,
    ) -> Result<FfiChartState, ClinicError> {
        let companion = absent_set(companion_absent)?;
        let mut chart = match stored_json {
            Some(json) => {
                let document: PeriodontogramDocument = serde_json::from_str(&json)?;
                same_patient(&patient_id, &document.patient_id)?;
                Periodontogram::from_document(document, None)
            }
            None => Periodontogram::new(patient_id.clone()),
        };
        chart.merge_absent(&companion);
        let state = FfiChartState::of(&chart);
        self.charts.lock()?.periodontograms.insert(patient_id, chart);
        Ok(state)
    }

    /// Measurements of one present tooth; `None` when absent.
    pub fn periodontogram_tooth(&self, patient_id: String, tooth_number: u8) -> Result<Option<FfiToothPerio>, ClinicError> {
        let t = tooth(tooth_number)?;
        let charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.measurements(t).map(|record| FfiToothPerio {
            tooth: tooth_number,
            mobility: record.mobility,
            bleeding: bleeding_name(record.bleeding),
            sites: record
                .surfaces
                .iter()
                .map(|(s, site)| FfiSite {
                    surface: s.as_str().to_string(),
                    label: s.label_for(t).to_string(),
                    probing_depth: site.probing_depth,
                    gingival_margin: site.gingival_margin,
                    bleeding: bleeding_name(site.bleeding),
                })
                .collect(),
        }))
    }

    pub fn select_periodontogram_surface(&self, patient_id: String, tooth_number: u8, surface_name: String) -> Result<(), ClinicError> {
        let (t, s) = (tooth(tooth_number)?, surface(&surface_name)?);
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        chart.select_surface(t, s)?;
        Ok(())
    }

    /// Returns the stored (clamped) value.
    pub fn set_probing_depth(&self, patient_id: String, value: i32) -> Result<u8, ClinicError> {
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.set_probing_depth(value)?)
    }

    /// Returns the stored (clamped) value.
    pub fn set_gingival_margin(&self, patient_id: String, value: i32) -> Result<i8, ClinicError> {
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.set_gingival_margin(value)?)
    }

    /// Advance bleeding on the selected surface.
    pub fn cycle_bleeding(&self, patient_id: String) -> Result<String, ClinicError> {
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(bleeding_name(chart.cycle_selected_bleeding()?))
    }

    /// Advance the whole-tooth bleeding toggle.
    pub fn cycle_tooth_bleeding(&self, patient_id: String, tooth_number: u8) -> Result<String, ClinicError> {
        let t = tooth(tooth_number)?;
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(bleeding_name(chart.cycle_tooth_bleeding(t)?))
    }

    pub fn set_mobility(&self, patient_id: String, tooth_number: u8, grade: u8) -> Result<(), ClinicError> {
        let t = tooth(tooth_number)?;
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        chart.set_mobility(t, grade)?;
        Ok(())
    }

    pub fn toggle_periodontogram_absent(&self, patient_id: String, tooth_number: u8) -> Result<bool, ClinicError> {
        let t = tooth(tooth_number)?;
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(chart.toggle_absent(t))
    }

    pub fn periodontogram_json(&self, patient_id: String) -> Result<String, ClinicError> {
        let charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        Ok(serde_json::to_string(&chart.to_document())?)
    }

    pub fn accept_periodontogram_echo(&self, patient_id: String, echo_json: String) -> Result<FfiChartState, ClinicError> {
        let document: PeriodontogramDocument = serde_json::from_str(&echo_json)?;
        same_patient(&patient_id, &document.patient_id)?;
        let mut charts = self.charts.lock()?;
        let chart = charts
            .periodontograms
            .get_mut(&patient_id)
            .ok_or_else(|| not_open(&patient_id))?;
        chart.replace_with(document);
        Ok(FfiChartState::of(chart))
    }
}

fn bleeding_name(bleeding: chart::Bleeding) -> String {
    match bleeding {
        chart::Bleeding::None => "none",
        chart::Bleeding::Primary => "primary",
        chart::Bleeding::Secondary => "secondary",
    }
    .to_string()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe session token.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAuthToken {
    pub token: String,
    pub refresh_token: Option<String>,
    pub username: Option<String>,
    /// Unix seconds
    pub expires_at: Option<i64>,
}

impl From<AuthToken> for FfiAuthToken {
    fn from(token: AuthToken) -> Self {
        Self {
            token: token.token,
            refresh_token: token.refresh_token,
            username: token.username,
            expires_at: token.expires_at.map(|t| t.timestamp()),
        }
    }
}

impl From<FfiAuthToken> for AuthToken {
    fn from(token: FfiAuthToken) -> Self {
        AuthToken {
            token: token.token,
            refresh_token: token.refresh_token,
            username: token.username,
            issued_at: Some(chrono::Utc::now()),
            expires_at: token
                .expires_at
                .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0)),
        }
    }
}

/// FFI-safe chart header.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChartState {
    pub patient_id: String,
    pub server_id: Option<String>,
    pub absent: Vec<u8>,
    pub has_unsaved_changes: bool,
}

impl FfiChartState {
    fn of<C: ChartModel>(chart: &C) -> Self {
        Self {
            patient_id: chart.patient_id().to_string(),
            server_id: chart.server_id().map(str::to_string),
            absent: chart.absent_teeth().iter().map(ToothNumber::get).collect(),
            has_unsaved_changes: chart.has_unsaved_changes(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSelection {
    pub tooth: u8,
    pub surface: String,
}

impl From<chart::Selection> for FfiSelection {
    fn from(selection: chart::Selection) -> Self {
        Self {
            tooth: selection.tooth.get(),
            surface: selection.surface.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSurfaceCondition {
    pub surface: String,
    /// "palatal" or "lingual" depending on the arch
    pub label: String,
    pub condition: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSite {
    pub surface: String,
    pub label: String,
    pub probing_depth: u8,
    pub gingival_margin: i8,
    pub bleeding: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiToothPerio {
    pub tooth: u8,
    pub mobility: u8,
    pub bleeding: String,
    pub sites: Vec<FfiSite>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_through_facade() {
        let core = open_clinic_in_memory().unwrap();
        assert!(core.current_token().unwrap().is_none());

        core.save_token(FfiAuthToken {
            token: "tok".into(),
            refresh_token: None,
            username: Some("dr.lopez".into()),
            expires_at: None,
        })
        .unwrap();
        assert_eq!(core.current_token().unwrap().map(|t| t.token).as_deref(), Some("tok"));

        core.logout().unwrap();
        assert!(core.current_token().unwrap().is_none());
    }

    #[test]
    fn test_odontogram_editing_through_facade() {
        let core = open_clinic_in_memory().unwrap();
        let state = core.open_odontogram("7".into(), None, vec![38]).unwrap();
        assert_eq!(state.absent, vec![38]);

        assert!(core.apply_condition("7".into(), "caries".into()).is_err());
        core.select_odontogram_surface("7".into(), 16, "palatal".into()).unwrap();
        let selection = core.apply_condition("7".into(), "caries".into()).unwrap();
        assert_eq!(selection.surface, "lingual");

        let surfaces = core.odontogram_tooth("7".into(), 16).unwrap();
        let lingual = surfaces.iter().find(|s| s.surface == "lingual").unwrap();
        assert_eq!(lingual.label, "palatal");
        assert_eq!(lingual.condition, "caries");

        let json = core.odontogram_json("7".into()).unwrap();
        let mut echo: serde_json::Value = serde_json::from_str(&json).unwrap();
        echo["id"] = serde_json::json!("42");
        let state = core.accept_odontogram_echo("7".into(), echo.to_string()).unwrap();
        assert_eq!(state.server_id.as_deref(), Some("42"));
        assert!(!state.has_unsaved_changes);
    }

    #[test]
    fn test_periodontogram_editing_through_facade() {
        let core = open_clinic_in_memory().unwrap();
        core.open_periodontogram("7".into(), None, vec![]).unwrap();

        core.select_periodontogram_surface("7".into(), 36, "occlusal".into()).unwrap();
        assert_eq!(core.set_probing_depth("7".into(), 40).unwrap(), 15);
        assert_eq!(core.cycle_bleeding("7".into()).unwrap(), "primary");
        assert!(core.set_mobility("7".into(), 36, 4).is_err());

        assert!(core.toggle_periodontogram_absent("7".into(), 36).unwrap());
        assert!(core.periodontogram_tooth("7".into(), 36).unwrap().is_none());
        assert!(matches!(
            core.set_probing_depth("7".into(), 3),
            Err(ClinicError::ChartError(_))
        ));
    }

    #[test]
    fn test_stored_chart_of_another_patient_is_rejected() {
        let core = open_clinic_in_memory().unwrap();
        let stored = r#"{"id": "3", "patient_id": "8", "teeth": {}}"#;

        assert!(matches!(
            core.open_odontogram("7".into(), Some(stored.into()), vec![]),
            Err(ClinicError::InvalidInput(_))
        ));
        assert!(matches!(
            core.open_periodontogram("7".into(), Some(stored.into()), vec![]),
            Err(ClinicError::InvalidInput(_))
        ));
        assert!(matches!(
            core.odontogram_json("7".into()),
            Err(ClinicError::NotFound(_))
        ));

        let state = core.open_odontogram("8".into(), Some(stored.into()), vec![]).unwrap();
        assert_eq!(state.server_id.as_deref(), Some("3"));
        assert!(!state.has_unsaved_changes);
        assert!(matches!(
            core.accept_odontogram_echo("8".into(), stored.replace("\"8\"", "\"9\"")),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_close_chart_releases_both_kinds() {
        let core = open_clinic_in_memory().unwrap();
        core.open_odontogram("7".into(), None, vec![]).unwrap();
        core.open_periodontogram("7".into(), None, vec![]).unwrap();
        core.open_odontogram("8".into(), None, vec![]).unwrap();

        assert!(core.close_chart("7".into()).unwrap());
        assert!(matches!(core.odontogram_json("7".into()), Err(ClinicError::NotFound(_))));
        assert!(matches!(core.periodontogram_json("7".into()), Err(ClinicError::NotFound(_))));
        assert!(core.odontogram_json("8".into()).is_ok());

        assert!(!core.close_chart("7".into()).unwrap());
    }

    #[test]
    fn test_unknown_patient_chart() {
        let core = open_clinic_in_memory().unwrap();
        assert!(matches!(
            core.odontogram_json("nobody".into()),
            Err(ClinicError::NotFound(_))
        ));
    }
}
