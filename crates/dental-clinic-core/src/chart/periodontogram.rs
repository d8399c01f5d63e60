//! Periodontogram: per-surface probing measurements and per-tooth mobility.
//!
//! Absent teeth suppress every other field: they cannot be edited, are
//! hidden from [`Periodontogram::measurements`] and are left out of the
//! serialized tooth map.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{
    fingerprint, AbsentTeeth, ChartError, ChartModel, ChartResult, Selection, Surface, ToothNumber,
};

/// Deepest probing depth accepted, in millimetres.
pub const PROBING_DEPTH_MAX: u8 = 15;

/// Gingival margin bounds in millimetres (positive = recession).
pub const GINGIVAL_MARGIN_MIN: i8 = -10;
pub const GINGIVAL_MARGIN_MAX: i8 = 10;

/// Highest mobility grade.
pub const MOBILITY_MAX: u8 = 3;

/// Bleeding indicator, cycled by successive clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bleeding {
    #[default]
    None,
    Primary,
    Secondary,
}

impl Bleeding {
    /// none -> primary -> secondary -> none
    pub fn next(self) -> Self {
        match self {
            Bleeding::None => Bleeding::Primary,
            Bleeding::Primary => Bleeding::Secondary,
            Bleeding::Secondary => Bleeding::None,
        }
    }

    pub fn is_bleeding(self) -> bool {
        self != Bleeding::None
    }
}

/// Measurements at one surface.
///
/// Stored values outside the accepted ranges are clamped on decode and
/// missing fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMeasurement {
    #[serde(deserialize_with = "de_probing_depth")]
    pub probing_depth: u8,
    #[serde(deserialize_with = "de_gingival_margin")]
    pub gingival_margin: i8,
    pub bleeding: Bleeding,
}

impl SiteMeasurement {
    /// Clinical attachment level: probing depth plus recession.
    pub fn attachment_level(&self) -> i16 {
        i16::from(self.probing_depth) + i16::from(self.gingival_margin)
    }
}

/// Periodontal record of one present tooth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToothPerio {
    pub surfaces: BTreeMap<Surface, SiteMeasurement>,
    #[serde(default, deserialize_with = "de_mobility")]
    pub mobility: u8,
    /// Aggregate bleeding toggle for the whole tooth.
    #[serde(default)]
    pub bleeding: Bleeding,
}

impl ToothPerio {
    fn zeroed(tooth: ToothNumber) -> Self {
        Self {
            surfaces: tooth
                .surfaces()
                .iter()
                .map(|&surface| (surface, SiteMeasurement::default()))
                .collect(),
            mobility: 0,
            bleeding: Bleeding::None,
        }
    }
}

pub fn clamp_probing_depth(value: i32) -> u8 {
    value.clamp(0, i32::from(PROBING_DEPTH_MAX)) as u8
}

pub fn clamp_gingival_margin(value: i32) -> i8 {
    value.clamp(i32::from(GINGIVAL_MARGIN_MIN), i32::from(GINGIVAL_MARGIN_MAX)) as i8
}

/// Decode any JSON integer (or null) and clamp it into `min..=max`.
fn de_clamped<'de, D: Deserializer<'de>>(deserializer: D, min: i64, max: i64) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?
        .unwrap_or_default()
        .clamp(min, max))
}

fn de_probing_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    de_clamped(deserializer, 0, i64::from(PROBING_DEPTH_MAX)).map(|v| v as u8)
}

fn de_gingival_margin<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i8, D::Error> {
    de_clamped(
        deserializer,
        i64::from(GINGIVAL_MARGIN_MIN),
        i64::from(GINGIVAL_MARGIN_MAX),
    )
    .map(|v| v as i8)
}

fn de_mobility<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    de_clamped(deserializer, 0, i64::from(MOBILITY_MAX)).map(|v| v as u8)
}

/// Wire format of a periodontogram save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodontogramDocument {
    #[serde(default, deserialize_with = "crate::models::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    /// Present teeth only.
    pub teeth: BTreeMap<ToothNumber, ToothPerio>,
    #[serde(default)]
    pub absent: AbsentTeeth,
    #[serde(default)]
    pub observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Editable periodontogram for one patient.
#[derive(Debug, Clone)]
pub struct Periodontogram {
    id: Option<String>,
    patient_id: String,
    teeth: BTreeMap<ToothNumber, ToothPerio>,
    absent: AbsentTeeth,
    observations: String,
    selection: Option<Selection>,
    updated_at: Option<String>,
    saved_fingerprint: Option<String>,
}

fn zeroed_teeth() -> BTreeMap<ToothNumber, ToothPerio> {
    ToothNumber::all()
        .map(|tooth| (tooth, ToothPerio::zeroed(tooth)))
        .collect()
}

impl Periodontogram {
    /// Fresh chart: every tooth present with zeroed measurements.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            id: None,
            patient_id: patient_id.into(),
            teeth: zeroed_teeth(),
            absent: AbsentTeeth::new(),
            observations: String::new(),
            selection: None,
            updated_at: None,
            saved_fingerprint: None,
        }
    }

    /// Load a prior chart, unioning its absence with the companion chart's.
    pub fn from_document(
        document: PeriodontogramDocument,
        companion_absent: Option<&AbsentTeeth>,
    ) -> Self {
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

    pub fn absent(&self) -> &AbsentTeeth {
        &self.absent
    }

    pub fn is_absent(&self, tooth: ToothNumber) -> bool {
        self.absent.contains(tooth)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Periodontal record of a present tooth.
    pub fn measurements(&self, tooth: ToothNumber) -> Option<&ToothPerio> {
        if self.is_absent(tooth) {
            None
        } else {
            self.teeth.get(&tooth)
        }
    }

    pub fn site(&self, tooth: ToothNumber, surface: Surface) -> Option<SiteMeasurement> {
        self.measurements(tooth)?.surfaces.get(&surface).copied()
    }

    pub fn editable_surfaces(&self, tooth: ToothNumber) -> Vec<Surface> {
        if self.is_absent(tooth) {
            Vec::new()
        } else {
            tooth.surfaces().to_vec()
        }
    }

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

    fn site_mut(&mut self, tooth: ToothNumber, surface: Surface) -> ChartResult<&mut SiteMeasurement> {
        if self.is_absent(tooth) {
            return Err(ChartError::ToothAbsent(tooth));
        }
        if !tooth.has_surface(surface) {
            return Err(ChartError::SurfaceNotOnTooth { tooth, surface });
        }
        Ok(self
            .teeth
            .entry(tooth)
            .or_insert_with(|| ToothPerio::zeroed(tooth))
            .surfaces
            .entry(surface)
            .or_default())
    }

    fn selected_site_mut(&mut self) -> ChartResult<&mut SiteMeasurement> {
        let selection = self.selection.ok_or(ChartError::NoSelection)?;
        self.site_mut(selection.tooth, selection.surface)
    }

    fn tooth_mut(&mut self, tooth: ToothNumber) -> ChartResult<&mut ToothPerio> {
        if self.is_absent(tooth) {
            return Err(ChartError::ToothAbsent(tooth));
        }
        Ok(self
            .teeth
            .entry(tooth)
            .or_insert_with(|| ToothPerio::zeroed(tooth)))
    }

    /// Set probing depth on the selected surface, clamped to range.
    pub fn set_probing_depth(&mut self, value: i32) -> ChartResult<u8> {
        let site = self.selected_site_mut()?;
        site.probing_depth = clamp_probing_depth(value);
        Ok(site.probing_depth)
    }

    /// Set gingival margin on the selected surface, clamped to range.
    pub fn set_gingival_margin(&mut self, value: i32) -> ChartResult<i8> {
        let site = self.selected_site_mut()?;
        site.gingival_margin = clamp_gingival_margin(value);
        Ok(site.gingival_margin)
    }

    /// Advance bleeding on the selected surface.
    pub fn cycle_selected_bleeding(&mut self) -> ChartResult<Bleeding> {
        let site = self.selected_site_mut()?;
        site.bleeding = site.bleeding.next();
        Ok(site.bleeding)
    }

    /// Advance bleeding on one surface (click on the bleeding marker).
    pub fn cycle_bleeding(&mut self, tooth: ToothNumber, surface: Surface) -> ChartResult<Bleeding> {
        let site = self.site_mut(tooth, surface)?;
        site.bleeding = site.bleeding.next();
        Ok(site.bleeding)
    }

    /// Advance the aggregate bleeding toggle of a tooth.
    pub fn cycle_tooth_bleeding(&mut self, tooth: ToothNumber) -> ChartResult<Bleeding> {
        let record = self.tooth_mut(tooth)?;
        record.bleeding = record.bleeding.next();
        Ok(record.bleeding)
    }

    pub fn set_mobility(&mut self, tooth: ToothNumber, grade: u8) -> ChartResult<()> {
        if grade > MOBILITY_MAX {
            return Err(ChartError::InvalidMobility(grade));
        }
        self.tooth_mut(tooth)?.mobility = grade;
        Ok(())
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

    fn present_sites(&self) -> impl Iterator<Item = &SiteMeasurement> + '_ {
        self.teeth
            .iter()
            .filter(|(tooth, _)| !self.absent.contains(**tooth))
            .flat_map(|(_, record)| record.surfaces.values())
    }

    /// Share of present sites that bled on probing, in percent.
    pub fn bleeding_on_probing_percent(&self) -> f64 {
        let (total, bleeding) = self
            .present_sites()
            .fold((0usize, 0usize), |(total, bleeding), site| {
                (total + 1, bleeding + usize::from(site.bleeding.is_bleeding()))
            });
        if total == 0 {
            0.0
        } else {
            bleeding as f64 * 100.0 / total as f64
        }
    }

    /// Mean probing depth over present sites, in millimetres.
    pub fn mean_probing_depth(&self) -> f64 {
        let (total, sum) = self
            .present_sites()
            .fold((0usize, 0u32), |(total, sum), site| {
                (total + 1, sum + u32::from(site.probing_depth))
            });
        if total == 0 {
            0.0
        } else {
            f64::from(sum) / total as f64
        }
    }
}

impl ChartModel for Periodontogram {
    type Document = PeriodontogramDocument;

    const RESOURCE: &'static str = "periodontograms";

    const COMPANION: &'static str = "odontograms";

    const LABEL: &'static str = "Periodontogram";

    fn blank(patient_id: &str) -> Self {
        Periodontogram::new(patient_id)
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }

    fn server_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_document(&self) -> PeriodontogramDocument {
        PeriodontogramDocument {
            id: self.id.clone(),
            patient_id: self.patient_id.clone(),
            teeth: self
                .teeth
                .iter()
                .filter(|(tooth, _)| !self.absent.contains(**tooth))
                .map(|(tooth, record)| (*tooth, record.clone()))
                .collect(),
            absent: self.absent.clone(),
            observations: self.observations.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn replace_with(&mut self, document: PeriodontogramDocument) {
        let mut teeth = zeroed_teeth();
        for (tooth, record) in document.teeth {
            let entry = teeth.entry(tooth).or_insert_with(|| ToothPerio::zeroed(tooth));
            entry.mobility = record.mobility;
            entry.bleeding = record.bleeding;
            for (surface, site) in record.surfaces {
                if tooth.has_surface(surface) {
                    entry.surfaces.insert(surface, site);
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
