//! Patient table filtering.
//!
//! Ranking:
//! - National ID prefix: 1.0, always first
//! - Name substring: 0.95
//! - Fuzzy name similarity: Jaro-Winkler 60% + normalized Levenshtein 40%

use std::cmp::Ordering;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::Patient;

/// Minimum fuzzy score for a name match to be listed.
pub const MIN_NAME_SCORE: f64 = 0.80;

const SUBSTRING_SCORE: f64 = 0.95;

/// How a patient matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    NationalId,
    Name,
    /// Empty query: everything is listed
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientMatch<'a> {
    pub patient: &'a Patient,
    pub kind: MatchKind,
    pub score: f64,
}

/// Filter and rank patients by free text.
pub fn search_patients<'a>(patients: &'a [Patient], query: &str) -> Vec<PatientMatch<'a>> {
    let query = query.trim().to_lowercase();
    let mut matches: Vec<PatientMatch<'a>> = if query.is_empty() {
        patients
            .iter()
            .map(|patient| PatientMatch {
                patient,
                kind: MatchKind::All,
                score: 1.0,
            })
            .collect()
    } else {
        let digits = crate::forms::digits_only(&query);
        // Only treat the query as an ID when it is mostly digits ("30.111" yes, "ana 3" no)
        let id_query = !digits.is_empty() && digits.len() * 2 >= query.chars().filter(|c| !c.is_whitespace()).count();
        patients
            .iter()
            .filter_map(|patient| {
                if id_query && patient.national_id.starts_with(&digits) {
                    return Some(PatientMatch {
                        patient,
                        kind: MatchKind::NationalId,
                        score: 1.0,
                    });
                }
                let score = name_score(patient, &query);
                (score >= MIN_NAME_SCORE).then_some(PatientMatch {
                    patient,
                    kind: MatchKind::Name,
                    score,
                })
            })
            .collect()
    };

    matches.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            .then_with(|| a.patient.display_name().cmp(&b.patient.display_name()))
    });
    matches
}

/// Best similarity between the query and the patient's names.
fn name_score(patient: &Patient, query: &str) -> f64 {
    let full = patient.full_name().to_lowercase();
    let reversed = format!("{} {}", patient.last_name.trim(), patient.first_name.trim()).to_lowercase();
    if full.contains(query) || reversed.contains(query) {
        return SUBSTRING_SCORE;
    }

    let words = full.split_whitespace().map(str::to_string);
    std::iter::once(full.clone())
        .chain(std::iter::once(reversed))
        .chain(words)
        .map(|candidate| fuzzy_match(&candidate, query))
        .fold(0.0, f64::max)
}

fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}
