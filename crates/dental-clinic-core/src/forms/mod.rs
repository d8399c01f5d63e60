//! Form controllers: local draft state, validation and create-or-update.
//!
//! Every screen that edits a backend resource follows the same cycle:
//!
//! ```text
//! edit draft ──► submit ──► normalize ──► validate ──✗──► field errors + error banner
//!                                            │ ✓
//!                             id present? ── PUT collection/id
//!                                   └─────── POST collection
//!                                            │
//!                        ok ──► success banner + one list refresh
//!                        err ─► error banner, draft and loaded record untouched
//! ```

mod validation;

pub use validation::*;

use chrono::{DateTime, NaiveDate, Utc};

use crate::backend::{self, BackendError, BackendResult, ClinicBackend, Resource, SaveKind};
use crate::notify::Notifications;

/// A resource that can be edited through a form.
pub trait FormModel: Resource + Default {
    /// Human-readable name used in banners.
    const LABEL: &'static str;

    /// Coerce fields before validation (e.g. digits-only phone numbers).
    fn normalize(&mut self) {}

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors>;
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    /// Blocked client-side; no request was sent.
    Invalid(ValidationErrors),
    Created(R),
    Updated(R),
    Failed(BackendError),
}

impl<R> SubmitOutcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_) | SubmitOutcome::Updated(_))
    }
}

/// Local state of one form plus the list it refreshes.
#[derive(Debug, Clone)]
pub struct FormController<R: FormModel> {
    draft: R,
    loaded: Option<R>,
    records: Vec<R>,
    errors: ValidationErrors,
    refresh_count: usize,
}

impl<R: FormModel> Default for FormController<R> {
    fn default() -> Self {
        Self {
            draft: R::default(),
            loaded: None,
            records: Vec::new(),
            errors: ValidationErrors::new(),
            refresh_count: 0,
        }
    }
}

impl<R: FormModel> FormController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &R {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R {
        &mut self.draft
    }

    /// Record last fetched from or saved to the backend.
    pub fn loaded(&self) -> Option<&R> {
        self.loaded.as_ref()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    /// Whether submit will update rather than create.
    pub fn is_editing(&self) -> bool {
        self.draft.id().is_some()
    }

    /// Clear the form back to a blank draft.
    pub fn reset(&mut self) {
        self.draft = R::default();
        self.loaded = None;
        self.errors = ValidationErrors::new();
    }

    /// Start editing a record already present in the list.
    pub fn edit(&mut self, record: R) {
        self.draft = record.clone();
        self.loaded = Some(record);
        self.errors = ValidationErrors::new();
    }

    /// Re-fetch the collection.
    pub fn refresh<B: ClinicBackend + ?Sized>(&mut self, backend: &B) -> BackendResult<usize> {
        self.refresh_count += 1;
        self.records = backend::list(backend)?;
        Ok(self.records.len())
    }

    /// Fetch one record into the form.
    pub fn load<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: &str,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) -> BackendResult<()> {
        match backend::fetch::<R, B>(backend, id) {
            Ok(record) => {
                self.edit(record);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(resource = R::COLLECTION, id, error = %e, "Load failed");
                notices.error(e.user_message(), now);
                Err(e)
            }
        }
    }

    /// Validate and send the draft.
    pub fn submit<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) -> SubmitOutcome<R> {
        let mut candidate = self.draft.clone();
        candidate.normalize();

        if let Err(errors) = candidate.validate(now.date_naive()) {
            let message = errors
                .first_message()
                .unwrap_or_else(|| "Please review the form".to_string());
            notices.error(message, now);
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = ValidationErrors::new();

        match backend::save(backend, &candidate) {
            Ok((echo, SaveKind::Created)) => {
                tracing::info!(resource = R::COLLECTION, id = ?echo.id(), "Record created");
                notices.success(format!("{} created", R::LABEL), now);
                self.reset();
                self.refresh_after_save(backend, notices, now);
                SubmitOutcome::Created(echo)
            }
            Ok((echo, SaveKind::Updated)) => {
                tracing::info!(resource = R::COLLECTION, id = ?echo.id(), "Record updated");
                notices.success(format!("{} updated", R::LABEL), now);
                self.edit(echo.clone());
                self.refresh_after_save(backend, notices, now);
                SubmitOutcome::Updated(echo)
            }
            Err(e) => {
                tracing::warn!(resource = R::COLLECTION, error = %e, "Submit failed");
                notices.error(e.user_message(), now);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Delete a record and refresh the list.
    pub fn delete<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: &str,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) -> BackendResult<()> {
        if let Err(e) = backend::remove::<R, B>(backend, id) {
            tracing::warn!(resource = R::COLLECTION, id, error = %e, "Delete failed");
            notices.error(e.user_message(), now);
            return Err(e);
        }
        tracing::info!(resource = R::COLLECTION, id, "Record deleted");
        notices.success(format!("{} deleted", R::LABEL), now);
        if self.draft.id() == Some(id) {
            self.reset();
        }
        self.refresh_after_save(backend, notices, now);
        Ok(())
    }

    fn refresh_after_save<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self.refresh(backend) {
            tracing::warn!(resource = R::COLLECTION, error = %e, "Refresh failed");
            notices.error(e.user_message(), now);
        }
    }
}
