//! Appointment models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::backend::Resource;
use crate::forms::{FormModel, ValidationErrors, Validator};

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

/// A booked slot in the agenda.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    /// Reason for the visit, shown as the calendar title
    pub reason: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(patient_id: impl Into<String>, reason: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            patient_id: patient_id.into(),
            reason: reason.into(),
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.start.map(|s| s.date())
    }

    /// Length in minutes, when both ends are set.
    pub fn duration_minutes(&self) -> Option<i64> {
        Some((self.end? - self.start?).num_minutes())
    }

    /// Half-open interval overlap.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        match (self.start, self.end, other.start, other.end) {
            (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => a_start < b_end && b_start < a_end,
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.status, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }
}

impl Resource for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for Appointment {
    const LABEL: &'static str = "Appointment";

    fn validate(&self, _today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("patient_id", &self.patient_id)
            .require("reason", &self.reason)
            .require_some("start", self.start.as_ref())
            .require_some("end", self.end.as_ref())
            .ordered("end", self.start.as_ref(), self.end.as_ref())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_end_must_follow_start() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let appointment = Appointment::new("p-1", "Checkup", at(10, 0), at(9, 30));
        let errors = appointment.validate(today).unwrap_err();
        assert!(errors.has("end"));

        let ok = Appointment::new("p-1", "Checkup", at(10, 0), at(10, 30));
        assert!(ok.validate(today).is_ok());
        assert_eq!(ok.duration_minutes(), Some(30));
    }

    #[test]
    fn test_missing_times_are_required() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let appointment = Appointment {
            patient_id: "p-1".into(),
            reason: "Cleaning".into(),
            ..Appointment::default()
        };
        let errors = appointment.validate(today).unwrap_err();
        assert!(errors.has("start"));
        assert!(errors.has("end"));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Appointment::new("p-1", "A", at(9, 0), at(10, 0));
        let b = Appointment::new("p-1", "B", at(10, 0), at(11, 0));
        let c = Appointment::new("p-1", "C", at(9, 30), at(9, 45));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
