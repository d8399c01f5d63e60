//! Odontogram: one condition per tooth surface.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    fingerprint, AbsentTeeth, ChartError, ChartModel, ChartResult, Selection, Surface, ToothNumber,
};

/// Condition recorded on a tooth surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Sound,
    Caries,
    Filled,
    Crowned,
    Extracted,
    Implant,
    InTreatment,
}

impl Condition {
    pub const ALL: [Condition; 7] = [
        Condition::Sound,
        Condition::Caries,
        Condition::Filled,
        Condition::Crowned,
        Condition::Extracted,
        Condition::Implant,
        Condition::InTreatment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Sound => "sound",
            Condition::Caries => "caries",
            Condition::Filled => "filled",
            Condition::Crowned => "crowned",
            Condition::Extracted => "extracted",
            Condition::Implant => "implant",
            Condition::InTreatment => "in_treatment",
        }
    }
}

impl FromStr for Condition {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| ChartError::UnknownCondition(s.to_string()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface conditions of a single tooth.
pub type SurfaceConditions = BTreeMap<Surface, Condition>;

/// Wire format of an odontogram save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdontogramDocument {
    #[serde(default, deserialize_with = "crate::models::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    pub teeth: BTreeMap<ToothNumber, SurfaceConditions>,
    #[serde(default)]
    pub absent: AbsentTeeth,
    #[serde(default)]
    pub observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Editable odontogram for one patient.
#[derive(Debug, Clone)]
pub struct Odontogram {
    id: Option<String>,
    patient_id: String,
    teeth: BTreeMap<ToothNumber, SurfaceConditions>,
    absent: AbsentTeeth,
    observations: String,
    selection: Option<Selection>,
    updated_at: Option<String>,
    saved_fingerprint: Option<String>,
}

fn sound_tooth(tooth: ToothNumber) -> SurfaceConditions {
    tooth
        .surfaces()
        .iter()
        .map(|&surface| (surface, Condition::Sound))
        .collect()
}

fn seeded_teeth() -> BTreeMap<ToothNumber, SurfaceConditions> {
    ToothNumber::all()
        .map(|tooth| (tooth, sound_tooth(tooth)))
        .collect()
}

impl Odontogram {
    /// Fresh chart: every tooth present, every surface sound.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            id: None,
            patient_id: patient_id.into(),
            teeth: seeded_teeth(),
            absent: AbsentTeeth::new(),
            observations: String::new(),
            selection: None,
            updated_at: None,
            saved_fingerprint: None,
        }
    }

    /// Load a prior chart, unioning its absence with the companion chart's.
    pub fn from_document(document: OdontogramDocument, companion_absent: Option<&AbsentTeeth>) -> Self {
        let mut chart = Self::new(document.patient_id.clone());
        chart.replace_with(document);
        if let Some(companion) = companion_absent {
            chart.merge_absent(companion);
        }
        chart
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    pub fn condition(&self, tooth: ToothNumber, surface: Surface) -> Option<Condition> {
        self.teeth.get(&tooth)?.get(&surface).copied()
    }

    pub fn tooth(&self, tooth: ToothNumber) -> Option<&SurfaceConditions> {
        self.teeth.get(&tooth)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn absent(&self) -> &AbsentTeeth {
        &self.absent
    }

    pub fn is_absent(&self, tooth: ToothNumber) -> bool {
        self.absent.contains(tooth)
    }

    /// Surfaces the user may click. Empty for absent teeth.
    pub fn editable_surfaces(&self, tooth: ToothNumber) -> Vec<Surface> {
        if self.is_absent(tooth) {
            Vec::new()
        } else {
            tooth.surfaces().to_vec()
        }
    }

    /// First step of an edit: pick the target surface.
    pub fn select_surface(&mut self, tooth: ToothNumber, surface: Surface) -> ChartResult<()> {
        if self.is_absent(tooth) {
            return Err(ChartError::ToothAbsent(tooth));
        }
        if !tooth.has_surface(surface) {
            return Err(ChartError::SurfaceNotOnTooth { tooth, surface });
        }
        self.selection = Some(Selection { tooth, surface });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Second step of an edit: write the condition to the selected surface.
    pub fn apply_condition(&mut self, condition: Condition) -> ChartResult<Selection> {
        let selection = self.selection.ok_or(ChartError::NoSelection)?;
        if self.is_absent(selection.tooth) {
            return Err(ChartError::ToothAbsent(selection.tooth));
        }
        self.teeth
            .entry(selection.tooth)
            .or_insert_with(|| sound_tooth(selection.tooth))
            .insert(selection.surface, condition);
        Ok(selection)
    }

    /// Flip the absent flag. Returns `true` if the tooth is now absent.
    pub fn toggle_absent(&mut self, tooth: ToothNumber) -> bool {
        let now_absent = self.absent.toggle(tooth);
        if now_absent && self.selection.map(|s| s.tooth) == Some(tooth) {
            self.selection = None;
        }
        now_absent
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    pub fn set_observations(&mut self, text: impl Into<String>) {
        self.observations = text.into();
    }

    /// Number of present-tooth surfaces per condition.
    pub fn condition_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (tooth, surfaces) in &self.teeth {
            if self.is_absent(*tooth) {
                continue;
            }
            for condition in surfaces.values() {
                *counts.entry(condition.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl ChartModel for Odontogram {
    type Document = OdontogramDocument;

    const RESOURCE: &'static str = "odontograms";

    const COMPANION: &'static str = "periodontograms";

    const LABEL: &'static str = "Odontogram";

    fn blank(patient_id: &str) -> Self {
        Odontogram::new(patient_id)
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }

    fn server_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_document(&self) -> OdontogramDocument {
        OdontogramDocument {
            id: self.id.clone(),
            patient_id: self.patient_id.clone(),
            teeth: self.teeth.clone(),
            absent: self.absent.clone(),
            observations: self.observations.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn replace_with(&mut self, document: OdontogramDocument) {
        let mut teeth = seeded_teeth();
        for (tooth, surfaces) in document.teeth {
            let entry = teeth.entry(tooth).or_insert_with(|| sound_tooth(tooth));
            for (surface, condition) in surfaces {
                if tooth.has_surface(surface) {
                    entry.insert(surface, condition);
                } else {
                    tracing::debug!(%tooth, %surface, "Ignoring surface not present on tooth");
                }
            }
        }

        self.id = document.id;
        self.patient_id = document.patient_id;
        self.teeth = teeth;
        self.absent = document.absent;
        self.observations = document.observations;
        self.updated_at = document.updated_at;
        if let Some(selection) = self.selection {
            if self.absent.contains(selection.tooth) {
                self.selection = None;
            }
        }
        self.saved_fingerprint = fingerprint(&self.to_document()).ok();
    }

    fn saved_fingerprint(&self) -> Option<&str> {
        self.saved_fingerprint.as_deref()
    }

    fn set_saved_fingerprint(&mut self, fingerprint: Option<String>) {
        self.saved_fingerprint = fingerprint;
    }

    fn absent_teeth(&self) -> &AbsentTeeth {
        &self.absent
    }

    fn merge_absent(&mut self, other: &AbsentTeeth) {
        self.absent.union_with(other.iter());
        if let Some(selection) = self.selection {
            if self.absent.contains(selection.tooth) {
                self.selection = None;
            }
        }
    }
}
