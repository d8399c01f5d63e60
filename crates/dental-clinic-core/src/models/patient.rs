//! Patient models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::backend::Resource;
use crate::forms::{digits_only, FormModel, ValidationErrors, Validator};

/// A patient record as exchanged with the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Server ID - null until created
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// National identity document, digits only
    pub national_id: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Phone number, digits only
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    /// Health insurance provider
    #[serde(default)]
    pub health_insurance: Option<String>,
    #[serde(default)]
    pub insurance_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
            ..Self::default()
        }
    }

    /// "Last, First" as shown in the patient table.
    pub fn display_name(&self) -> String {
        match (self.last_name.trim(), self.first_name.trim()) {
            ("", first) => first.to_string(),
            (last, "") => last.to_string(),
            (last, first) => format!("{}, {}", last, first),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if birth > today {
            return None;
        }
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

impl Resource for Patient {
    const COLLECTION: &'static str = "patients";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for Patient {
    const LABEL: &'static str = "Patient";

    fn normalize(&mut self) {
        self.national_id = digits_only(&self.national_id);
        self.phone = digits_only(&self.phone);
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        if let Some(email) = &self.email {
            let email = email.trim().to_lowercase();
            self.email = (!email.is_empty()).then_some(email);
        }
    }

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("first_name", &self.first_name)
            .require("last_name", &self.last_name)
            .require("national_id", &self.national_id)
            .email("email", super::blank(&self.email))
            .not_future("birth_date", self.birth_date, today)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_patient() {
        let patient = Patient::new("Ana", "Pérez", "30111222");
        assert_eq!(patient.display_name(), "Pérez, Ana");
        assert_eq!(patient.full_name(), "Ana Pérez");
        assert!(patient.id.is_none());
    }

    #[test]
    fn test_normalize_coerces_numeric_fields() {
        let mut patient = Patient::new(" Ana ", "Pérez", "30.111.222");
        patient.phone = "(011) 4555-1234".into();
        patient.email = Some("  Ana@Mail.COM ".into());
        patient.normalize();

        assert_eq!(patient.national_id, "30111222");
        assert_eq!(patient.phone, "01145551234");
        assert_eq!(patient.first_name, "Ana");
        assert_eq!(patient.email.as_deref(), Some("ana@mail.com"));
    }

    #[test]
    fn test_validation() {
        let today = date(2024, 6, 1);
        let mut patient = Patient::new("Ana", "", "abc");
        patient.normalize();
        patient.birth_date = Some(date(2025, 1, 1));

        let errors = patient.validate(today).unwrap_err();
        assert!(errors.has("last_name"));
        assert!(errors.has("national_id"));
        assert!(errors.has("birth_date"));
        assert!(!errors.has("first_name"));
    }

    #[test]
    fn test_age() {
        let mut patient = Patient::new("Ana", "Pérez", "1");
        patient.birth_date = Some(date(1990, 6, 2));
        assert_eq!(patient.age_on(date(2024, 6, 1)), Some(33));
        assert_eq!(patient.age_on(date(2024, 6, 2)), Some(34));
    }

    #[test]
    fn test_numeric_id_from_backend() {
        let json = r#"{"id": 42, "first_name": "Ana", "last_name": "Pérez", "national_id": "1"}"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.id.as_deref(), Some("42"));
    }
}
