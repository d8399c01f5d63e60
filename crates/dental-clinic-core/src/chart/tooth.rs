//! FDI tooth numbering and per-class surface sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ChartError, ChartResult};

/// Permanent teeth in chart layout order (upper right to upper left,
/// then lower right to lower left).
pub const CHART_LAYOUT: [u8; 32] = [
    18, 17, 16, 15, 14, 13, 12, 11, 21, 22, 23, 24, 25, 26, 27, 28, //
    48, 47, 46, 45, 44, 43, 42, 41, 31, 32, 33, 34, 35, 36, 37, 38,
];

/// Teeth with an occlusal surface.
const PREMOLARS: [u8; 8] = [14, 15, 24, 25, 34, 35, 44, 45];
const MOLARS: [u8; 12] = [16, 17, 18, 26, 27, 28, 36, 37, 38, 46, 47, 48];

/// A permanent tooth identified by its two-digit FDI number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// Validate an FDI number (quadrant 1-4, position 1-8).
    pub fn new(number: u8) -> ChartResult<Self> {
        let quadrant = number / 10;
        let position = number % 10;
        if (1..=4).contains(&quadrant) && (1..=8).contains(&position) {
            Ok(Self(number))
        } else {
            Err(ChartError::InvalidTooth(number))
        }
    }

    /// All 32 teeth in chart layout order.
    pub fn all() -> impl Iterator<Item = ToothNumber> {
        CHART_LAYOUT.iter().map(|&n| ToothNumber(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    pub fn position(self) -> u8 {
        self.0 % 10
    }

    /// Upper arch (quadrants 1 and 2).
    pub fn is_upper(self) -> bool {
        self.quadrant() <= 2
    }

    pub fn class(self) -> ToothClass {
        if MOLARS.contains(&self.0) {
            ToothClass::Molar
        } else if PREMOLARS.contains(&self.0) {
            ToothClass::Premolar
        } else if self.position() == 3 {
            ToothClass::Canine
        } else {
            ToothClass::Incisor
        }
    }

    /// Surfaces this tooth can be charted on.
    pub fn surfaces(self) -> &'static [Surface] {
        if self.class().is_posterior() {
            &POSTERIOR_SURFACES
        } else {
            &ANTERIOR_SURFACES
        }
    }

    pub fn has_surface(self, surface: Surface) -> bool {
        self.surfaces().contains(&surface)
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = ChartError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ToothNumber::new(value)
    }
}

impl From<ToothNumber> for u8 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.0
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anatomical class of a tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToothClass {
    Incisor,
    Canine,
    Premolar,
    Molar,
}

impl ToothClass {
    /// Premolars and molars carry an occlusal surface.
    pub fn is_posterior(self) -> bool {
        matches!(self, ToothClass::Premolar | ToothClass::Molar)
    }
}

/// One face of a tooth.
///
/// `Lingual` is the inner face: palatal on the upper arch, lingual on the
/// lower arch. Both names parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Vestibular,
    Mesial,
    Distal,
    #[serde(alias = "palatal")]
    Lingual,
    Occlusal,
}

const ANTERIOR_SURFACES: [Surface; 4] = [
    Surface::Vestibular,
    Surface::Mesial,
    Surface::Distal,
    Surface::Lingual,
];

const POSTERIOR_SURFACES: [Surface; 5] = [
    Surface::Vestibular,
    Surface::Mesial,
    Surface::Distal,
    Surface::Lingual,
    Surface::Occlusal,
];

impl Surface {
    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Vestibular => "vestibular",
            Surface::Mesial => "mesial",
            Surface::Distal => "distal",
            Surface::Lingual => "lingual",
            Surface::Occlusal => "occlusal",
        }
    }

    /// Display label on a given tooth.
    pub fn label_for(self, tooth: ToothNumber) -> &'static str {
        match self {
            Surface::Lingual if tooth.is_upper() => "palatal",
            other => other.as_str(),
        }
    }
}

impl FromStr for Surface {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vestibular" | "buccal" => Ok(Surface::Vestibular),
            "mesial" => Ok(Surface::Mesial),
            "distal" => Ok(Surface::Distal),
            "lingual" | "palatal" => Ok(Surface::Lingual),
            "occlusal" => Ok(Surface::Occlusal),
            _ => Err(ChartError::UnknownSurface(s.to_string())),
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_valid_and_invalid_numbers() {
        assert!(ToothNumber::new(11).is_ok());
        assert!(ToothNumber::new(48).is_ok());
        assert!(matches!(ToothNumber::new(19), Err(ChartError::InvalidTooth(19))));
        assert!(ToothNumber::new(50).is_err());
        assert!(ToothNumber::new(10).is_err());
        assert!(ToothNumber::new(0).is_err());
    }

    #[test]
    fn test_layout_has_32_unique_teeth() {
        let teeth: std::collections::BTreeSet<_> = ToothNumber::all().collect();
        assert_eq!(teeth.len(), 32);
        assert_eq!(ToothNumber::all().next(), Some(tooth(18)));
    }

    #[test]
    fn test_classes() {
        assert_eq!(tooth(11).class(), ToothClass::Incisor);
        assert_eq!(tooth(42).class(), ToothClass::Incisor);
        assert_eq!(tooth(23).class(), ToothClass::Canine);
        assert_eq!(tooth(34).class(), ToothClass::Premolar);
        assert_eq!(tooth(46).class(), ToothClass::Molar);
        assert_eq!(tooth(18).class(), ToothClass::Molar);
    }

    #[test]
    fn test_premolar_has_five_surfaces_incisor_four() {
        assert_eq!(tooth(15).surfaces().len(), 5);
        assert!(tooth(15).has_surface(Surface::Occlusal));
        assert_eq!(tooth(21).surfaces().len(), 4);
        assert!(!tooth(21).has_surface(Surface::Occlusal));
        assert_eq!(tooth(33).surfaces().len(), 4);
    }

    #[test]
    fn test_palatal_label_on_upper_arch() {
        assert_eq!(Surface::Lingual.label_for(tooth(16)), "palatal");
        assert_eq!(Surface::Lingual.label_for(tooth(36)), "lingual");
        assert_eq!("Palatal".parse::<Surface>().unwrap(), Surface::Lingual);
        assert!("cervical".parse::<Surface>().is_err());
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&tooth(46)).unwrap();
        assert_eq!(json, "46");
        let parsed: ToothNumber = serde_json::from_str("21").unwrap();
        assert_eq!(parsed, tooth(21));
        assert!(serde_json::from_str::<ToothNumber>("99").is_err());
    }
}
