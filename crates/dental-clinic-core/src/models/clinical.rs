//! Clinical records: history, diagnosis/prognosis, treatment plan and
//! periodontics follow-up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::Resource;
use crate::chart::{Periodontogram, Surface, ToothNumber};
use crate::forms::{FormModel, ValidationErrors, Validator};

/// Medical background checkboxes of the clinical history form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MedicalConditions {
    pub diabetes: bool,
    pub hypertension: bool,
    pub heart_disease: bool,
    pub coagulation_disorder: bool,
    pub hepatitis: bool,
    pub asthma: bool,
    pub epilepsy: bool,
    pub pregnancy: bool,
    pub allergies: bool,
    /// Free text for anything not listed
    pub other: Option<String>,
}

impl MedicalConditions {
    /// Names of the checked conditions, in form order.
    pub fn checked(&self) -> Vec<&'static str> {
        [
            ("diabetes", self.diabetes),
            ("hypertension", self.hypertension),
            ("heart_disease", self.heart_disease),
            ("coagulation_disorder", self.coagulation_disorder),
            ("hepatitis", self.hepatitis),
            ("asthma", self.asthma),
            ("epilepsy", self.epilepsy),
            ("pregnancy", self.pregnancy),
            ("allergies", self.allergies),
        ]
        .into_iter()
        .filter_map(|(name, checked)| checked.then_some(name))
        .collect()
    }
}

/// Oral habits checkboxes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OralHabits {
    pub smoking: bool,
    pub alcohol: bool,
    pub bruxism: bool,
    pub nail_biting: bool,
    pub mouth_breathing: bool,
}

/// Clinical history (anamnesis) of a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicalHistory {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    pub consultation_reason: String,
    #[serde(default)]
    pub current_illness: Option<String>,
    #[serde(default)]
    pub conditions: MedicalConditions,
    /// Required when `conditions.allergies` is checked
    #[serde(default)]
    pub allergy_details: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub habits: OralHabits,
    #[serde(default)]
    pub last_dental_visit: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Resource for ClinicalHistory {
    const COLLECTION: &'static str = "clinical-histories";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for ClinicalHistory {
    const LABEL: &'static str = "Clinical history";

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("patient_id", &self.patient_id)
            .require("consultation_reason", &self.consultation_reason)
            .check(
                !self.conditions.allergies || !super::blank(&self.allergy_details).is_empty(),
                "allergy_details",
                "Describe the allergies",
            )
            .not_future("last_dental_visit", self.last_dental_visit, today)
            .finish()
    }
}

/// Prognosis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prognosis {
    Good,
    Fair,
    Poor,
    Questionable,
    Hopeless,
}

/// Diagnosis and prognosis record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub diagnosis: String,
    #[serde(default)]
    pub prognosis: Option<Prognosis>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Resource for Diagnosis {
    const COLLECTION: &'static str = "diagnoses";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for Diagnosis {
    const LABEL: &'static str = "Diagnosis";

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("patient_id", &self.patient_id)
            .require("diagnosis", &self.diagnosis)
            .not_future("date", self.date, today)
            .finish()
    }
}

/// One procedure in a treatment plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlannedProcedure {
    #[serde(default)]
    pub tooth: Option<ToothNumber>,
    #[serde(default)]
    pub surfaces: Vec<Surface>,
    pub description: String,
    /// Treatment phase (1 = urgent, 2 = restorative, ...)
    #[serde(default)]
    pub phase: u8,
    #[serde(default)]
    pub completed: bool,
}

/// Ordered list of procedures for a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPlan {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    #[serde(default)]
    pub created_on: Option<NaiveDate>,
    #[serde(default)]
    pub procedures: Vec<PlannedProcedure>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TreatmentPlan {
    /// Fraction of completed procedures, 0.0 for an empty plan.
    pub fn progress(&self) -> f64 {
        if self.procedures.is_empty() {
            return 0.0;
        }
        let done = self.procedures.iter().filter(|p| p.completed).count();
        done as f64 / self.procedures.len() as f64
    }

    /// Pending procedures, lowest phase first.
    pub fn pending(&self) -> Vec<&PlannedProcedure> {
        let mut pending: Vec<_> = self.procedures.iter().filter(|p| !p.completed).collect();
        pending.sort_by_key(|p| p.phase);
        pending
    }
}

impl Resource for TreatmentPlan {
    const COLLECTION: &'static str = "treatment-plans";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for TreatmentPlan {
    const LABEL: &'static str = "Treatment plan";

    fn validate(&self, _today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator
            .require("patient_id", &self.patient_id)
            .check(!self.procedures.is_empty(), "procedures", "Add at least one procedure");
        for (index, procedure) in self.procedures.iter().enumerate() {
            let field = format!("procedures[{}]", index);
            validator.require(&field, &procedure.description);
            if let Some(tooth) = procedure.tooth {
                let fits = procedure.surfaces.iter().all(|s| tooth.has_surface(*s));
                validator.check(fits, &field, "Surface not present on this tooth");
            }
        }
        validator.finish()
    }
}

/// Periodontics follow-up record (plaque and bleeding indices).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeriodonticsRecord {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Plaque index, percent of sites
    #[serde(default)]
    pub plaque_index: f64,
    /// Bleeding index, percent of sites
    #[serde(default)]
    pub bleeding_index: f64,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PeriodonticsRecord {
    /// Prefill the bleeding index from the patient's periodontogram.
    pub fn from_chart(patient_id: impl Into<String>, chart: &Periodontogram) -> Self {
        Self {
            patient_id: patient_id.into(),
            bleeding_index: (chart.bleeding_on_probing_percent() * 10.0).round() / 10.0,
            ..Self::default()
        }
    }
}

impl Resource for PeriodonticsRecord {
    const COLLECTION: &'static str = "periodontics";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for PeriodonticsRecord {
    const LABEL: &'static str = "Periodontics record";

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("patient_id", &self.patient_id)
            .percent("plaque_index", self.plaque_index)
            .percent("bleeding_index", self.bleeding_index)
            .not_future("date", self.date, today)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_allergy_details_required_when_checked() {
        let mut history = ClinicalHistory {
            patient_id: "p-1".into(),
            consultation_reason: "Pain".into(),
            ..ClinicalHistory::default()
        };
        assert!(history.validate(today()).is_ok());

        history.conditions.allergies = true;
        let errors = history.validate(today()).unwrap_err();
        assert!(errors.has("allergy_details"));

        history.allergy_details = Some("Penicillin".into());
        assert!(history.validate(today()).is_ok());
        assert_eq!(history.conditions.checked(), vec!["allergies"]);
    }

    #[test]
    fn test_nested_checkboxes_default_when_missing() {
        let json = r#"{"patient_id": "1", "consultation_reason": "Checkup", "conditions": {"diabetes": true}}"#;
        let history: ClinicalHistory = serde_json::from_str(json).unwrap();
        assert!(history.conditions.diabetes);
        assert!(!history.conditions.asthma);
        assert!(!history.habits.bruxism);
    }

    #[test]
    fn test_diagnosis_requires_text() {
        let diagnosis = Diagnosis {
            patient_id: "p-1".into(),
            ..Diagnosis::default()
        };
        assert!(diagnosis.validate(today()).unwrap_err().has("diagnosis"));
    }

    #[test]
    fn test_treatment_plan_validation() {
        let mut plan = TreatmentPlan {
            patient_id: "p-1".into(),
            ..TreatmentPlan::default()
        };
        assert!(plan.validate(today()).unwrap_err().has("procedures"));

        plan.procedures.push(PlannedProcedure {
            tooth: Some(ToothNumber::new(11).unwrap()),
            surfaces: vec![Surface::Occlusal],
            description: "Composite".into(),
            ..PlannedProcedure::default()
        });
        assert!(plan.validate(today()).unwrap_err().has("procedures[0]"));

        plan.procedures[0].surfaces = vec![Surface::Mesial];
        assert!(plan.validate(today()).is_ok());
    }

    #[test]
    fn test_treatment_plan_progress() {
        let plan = TreatmentPlan {
            patient_id: "p-1".into(),
            procedures: vec![
                PlannedProcedure { description: "Scaling".into(), phase: 1, completed: true, ..Default::default() },
                PlannedProcedure { description: "Crown".into(), phase: 3, ..Default::default() },
                PlannedProcedure { description: "Filling".into(), phase: 2, ..Default::default() },
                PlannedProcedure { description: "Extraction".into(), phase: 1, completed: true, ..Default::default() },
            ],
            ..TreatmentPlan::default()
        };
        assert_eq!(plan.progress(), 0.5);
        let pending: Vec<_> = plan.pending().iter().map(|p| p.description.as_str()).collect();
        assert_eq!(pending, vec!["Filling", "Crown"]);
    }

    #[test]
    fn test_periodontics_indices_bounded() {
        let record = PeriodonticsRecord {
            patient_id: "p-1".into(),
            plaque_index: 120.0,
            ..PeriodonticsRecord::default()
        };
        assert!(record.validate(today()).unwrap_err().has("plaque_index"));
    }

    #[test]
    fn test_periodontics_from_chart() {
        let mut chart = Periodontogram::new("p-1");
        for tooth in ToothNumber::all() {
            if tooth.get() != 11 {
                chart.toggle_absent(tooth);
            }
        }
        chart
            .cycle_bleeding(ToothNumber::new(11).unwrap(), Surface::Mesial)
            .unwrap();
        let record = PeriodonticsRecord::from_chart("p-1", &chart);
        assert_eq!(record.bleeding_index, 25.0);
    }
}
