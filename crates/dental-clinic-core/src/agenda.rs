//! Appointment book behind the agenda calendar.
//!
//! Create, edit and delete all go through one modal:
//!
//! ```text
//! Closed ──open_create(slot)──► Creating ──save ok──► Closed
//!    │                                                  ▲
//!    └──open_edit(id)───► Editing(id) ──save/delete ok──┘
//! ```
//!
//! A failed or invalid save keeps the modal open with the draft intact.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::backend::{BackendResult, ClinicBackend};
use crate::forms::{FormController, SubmitOutcome};
use crate::models::{Appointment, AppointmentStatus, Patient};
use crate::notify::Notifications;

/// Slot length used when a new appointment is opened from the calendar.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Modal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Creating,
    Editing(String),
}

/// Event in the shape the calendar widget expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone)]
pub struct AppointmentBook {
    form: FormController<Appointment>,
    modal: Modal,
}

impl Default for AppointmentBook {
    fn default() -> Self {
        Self {
            form: FormController::new(),
            modal: Modal::Closed,
        }
    }
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.form.records()
    }

    pub fn refresh<B: ClinicBackend + ?Sized>(&mut self, backend: &B) -> BackendResult<usize> {
        self.form.refresh(backend)
    }

    pub fn refresh_count(&self) -> usize {
        self.form.refresh_count()
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn draft(&self) -> &Appointment {
        self.form.draft()
    }

    pub fn draft_mut(&mut self) -> &mut Appointment {
        self.form.draft_mut()
    }

    pub fn form(&self) -> &FormController<Appointment> {
        &self.form
    }

    /// Open a blank appointment, prefilled with the clicked slot.
    pub fn open_create(&mut self, patient_id: Option<&str>, slot_start: Option<NaiveDateTime>) {
        self.form.reset();
        let draft = self.form.draft_mut();
        if let Some(patient_id) = patient_id {
            draft.patient_id = patient_id.to_string();
        }
        if let Some(start) = slot_start {
            draft.start = Some(start);
            draft.end = Some(start + Duration::minutes(DEFAULT_SLOT_MINUTES));
        }
        self.modal = Modal::Creating;
    }

    /// Open an existing appointment. Returns false if it is not in the list.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.appointments().iter().find(|a| a.id.as_deref() == Some(id)).cloned() else {
            return false;
        };
        self.form.edit(record);
        self.modal = Modal::Editing(id.to_string());
        true
    }

    pub fn close(&mut self) {
        self.form.reset();
        self.modal = Modal::Closed;
    }

    /// Submit the modal's draft.
    pub fn save<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) -> SubmitOutcome<Appointment> {
        let clashes = self.conflicts(self.form.draft()).len();
        if clashes > 0 {
            tracing::warn!(clashes, patient_id = %self.form.draft().patient_id, "Overlapping appointment");
        }
        let outcome = self.form.submit(backend, notices, now);
        if outcome.is_success() {
            self.close();
        }
        outcome
    }

    /// Delete the appointment being edited.
    pub fn delete<B: ClinicBackend + ?Sized>(
        &mut self,
        backend: &B,
        notices: &mut Notifications,
        now: DateTime<Utc>,
    ) -> BackendResult<bool> {
        let Modal::Editing(id) = self.modal.clone() else {
            return Ok(false);
        };
        self.form.delete(backend, &id, notices, now)?;
        self.close();
        Ok(true)
    }

    /// Appointments starting on `day`, earliest first.
    pub fn on_day(&self, day: NaiveDate) -> Vec<&Appointment> {
        self.sorted_where(|a| a.date() == Some(day))
    }

    /// Appointments in the ISO week containing `day`.
    pub fn in_week(&self, day: NaiveDate) -> Vec<&Appointment> {
        let week = day.iso_week();
        self.sorted_where(|a| a.date().map(|d| d.iso_week()) == Some(week))
    }

    fn sorted_where<F>(&self, keep: F) -> Vec<&Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        let mut found: Vec<&Appointment> = self.appointments().iter().filter(|a| keep(a)).collect();
        found.sort_by_key(|a| a.start);
        found
    }

    /// Other active appointments of the same patient overlapping `candidate`.
    /// A warning only; saving is never blocked.
    pub fn conflicts(&self, candidate: &Appointment) -> Vec<&Appointment> {
        self.appointments()
            .iter()
            .filter(|a| candidate.id.is_none() || a.id != candidate.id)
            .filter(|a| a.patient_id == candidate.patient_id && a.is_active())
            .filter(|a| a.overlaps(candidate))
            .collect()
    }

    /// Calendar events; titles carry the patient name when known.
    pub fn calendar_events(&self, patients: &[Patient]) -> Vec<CalendarEvent> {
        self.appointments()
            .iter()
            .filter_map(|a| {
                let (id, start, end) = (a.id.clone()?, a.start?, a.end?);
                let patient = patients.iter().find(|p| p.id.as_deref() == Some(a.patient_id.as_str()));
                let title = match patient {
                    Some(p) => format!("{} - {}", p.full_name(), a.reason),
                    None => a.reason.clone(),
                };
                Some(CalendarEvent {
                    id,
                    title,
                    start,
                    end,
                    status: a.status,
                })
            })
            .collect()
    }
}
