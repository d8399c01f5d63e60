//! Absent-teeth set shared by both charts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ToothNumber;

/// Set of teeth marked absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsentTeeth(BTreeSet<ToothNumber>);

impl AbsentTeeth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tooth: ToothNumber) -> bool {
        self.0.contains(&tooth)
    }

    /// Flip membership. Returns `true` if the tooth is now absent.
    pub fn toggle(&mut self, tooth: ToothNumber) -> bool {
        if self.0.remove(&tooth) {
            false
        } else {
            self.0.insert(tooth);
            true
        }
    }

    /// Add every tooth from `other`. Absence is never removed by a merge.
    pub fn union_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = ToothNumber>,
    {
        self.0.extend(other);
    }

    pub fn iter(&self) -> impl Iterator<Item = ToothNumber> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ToothNumber> for AbsentTeeth {
    fn from_iter<I: IntoIterator<Item = ToothNumber>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut absent = AbsentTeeth::new();
        assert!(absent.toggle(tooth(36)));
        assert!(absent.contains(tooth(36)));
        assert!(!absent.toggle(tooth(36)));
        assert!(absent.is_empty());
    }

    #[test]
    fn test_union_never_intersects() {
        let mut own: AbsentTeeth = [tooth(18), tooth(28)].into_iter().collect();
        let companion: AbsentTeeth = [tooth(28), tooth(48)].into_iter().collect();
        own.union_with(companion.iter());
        assert_eq!(own.len(), 3);
        assert!(own.contains(tooth(18)));
        assert!(own.contains(tooth(48)));
    }

    #[test]
    fn test_serializes_as_sorted_array() {
        let absent: AbsentTeeth = [tooth(38), tooth(11)].into_iter().collect();
        assert_eq!(serde_json::to_string(&absent).unwrap(), "[11,38]");
    }
}
