//! Tooth charts: odontogram and periodontogram.
//!
//! Both charts share the same interaction model:
//!
//! ```text
//!   click surface ──► Selection { tooth, surface }
//!                          │
//!   click value   ──► apply to selected pair only
//!
//!   toggle absent ──► AbsentTeeth (flip membership, clears selection on that tooth)
//!
//!   save          ──► one JSON document ──► backend ──► echo replaces local state
//! ```
//!
//! Absent teeth are shared between the two charts of a patient: on load,
//! each chart unions its own absent set with its companion's.

mod absence;
mod odontogram;
mod periodontogram;
mod sync;
mod tooth;

pub use absence::*;
pub use odontogram::*;
pub use periodontogram::*;
pub use sync::*;
pub use tooth::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Chart editing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Invalid FDI tooth number: {0}")]
    InvalidTooth(u8),

    #[error("Tooth {tooth} has no {surface} surface")]
    SurfaceNotOnTooth { tooth: ToothNumber, surface: Surface },

    #[error("Tooth {0} is marked absent")]
    ToothAbsent(ToothNumber),

    #[error("No surface selected")]
    NoSelection,

    #[error("Mobility grade must be between 0 and 3, got {0}")]
    InvalidMobility(u8),

    #[error("Unknown surface: {0}")]
    UnknownSurface(String),

    #[error("Unknown condition: {0}")]
    UnknownCondition(String),
}

pub type ChartResult<T> = Result<T, ChartError>;

/// The (tooth, surface) pair a value will be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub tooth: ToothNumber,
    pub surface: Surface,
}

/// Common behaviour of a chart that is persisted as a single document.
pub trait ChartModel {
    /// Serialized form sent to and echoed by the backend.
    type Document: Serialize + DeserializeOwned + Clone;

    /// REST collection name.
    const RESOURCE: &'static str;

    /// Collection of the other chart sharing this chart's absent teeth.
    const COMPANION: &'static str;

    /// Banner label.
    const LABEL: &'static str;

    /// Blank chart for a patient with nothing stored yet.
    fn blank(patient_id: &str) -> Self
    where
        Self: Sized;

    fn patient_id(&self) -> &str;

    /// Server-assigned identifier, present once the chart has been saved.
    fn server_id(&self) -> Option<&str>;

    fn to_document(&self) -> Self::Document;

    /// Replace local state with a document returned by the backend.
    ///
    /// The normalized state becomes the saved baseline, so a freshly
    /// loaded chart has no unsaved changes.
    fn replace_with(&mut self, document: Self::Document);

    /// Fingerprint of the last document loaded from or saved to the backend.
    fn saved_fingerprint(&self) -> Option<&str>;

    fn set_saved_fingerprint(&mut self, fingerprint: Option<String>);

    fn absent_teeth(&self) -> &AbsentTeeth;

    /// Add teeth marked absent elsewhere. Never removes.
    fn merge_absent(&mut self, other: &AbsentTeeth);

    /// Whether the current state differs from the last saved document.
    fn has_unsaved_changes(&self) -> bool {
        match (fingerprint(&self.to_document()), self.saved_fingerprint()) {
            (Ok(current), Some(saved)) => current != saved,
            _ => true,
        }
    }
}

/// SHA-256 hex digest of a document's canonical JSON.
///
/// Documents use ordered maps and sets, so equal states hash equally.
pub fn fingerprint<T: Serialize>(document: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(document)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
