//! Client-side field validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages.
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize)]
#[error("{} field(s) failed validation", .fields.len())]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// First message, prefixed by its field, for the error banner.
    pub fn first_message(&self) -> Option<String> {
        self.fields
            .iter()
            .next()
            .and_then(|(field, messages)| messages.first().map(|m| format!("{}: {}", field, m)))
    }
}

/// Accumulates validation failures for one form.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-empty after trimming.
    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.add(field, "This field is required");
        }
        self
    }

    pub fn require_some<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.errors.add(field, "This field is required");
        }
        self
    }

    /// Only checked when non-empty.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !looks_like_email(value) {
            self.errors.add(field, "Enter a valid email address");
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.errors
                .add(field, format!("Must be at least {} characters", min));
        }
        self
    }

    /// Dates such as birth or payment dates cannot be in the future.
    pub fn not_future(&mut self, field: &str, date: Option<NaiveDate>, today: NaiveDate) -> &mut Self {
        if matches!(date, Some(d) if d > today) {
            self.errors.add(field, "Date cannot be in the future");
        }
        self
    }

    /// `end` must be strictly after `start` when both are set.
    pub fn ordered<T: PartialOrd>(&mut self, field: &str, start: Option<&T>, end: Option<&T>) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                self.errors.add(field, "End must be after start");
            }
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !(value > 0.0) {
            self.errors.add(field, "Must be greater than zero");
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !(value >= 0.0) {
            self.errors.add(field, "Cannot be negative");
        }
        self
    }

    pub fn percent(&mut self, field: &str, value: f64) -> &mut Self {
        if !(0.0..=100.0).contains(&value) {
            self.errors.add(field, "Must be between 0 and 100");
        }
        self
    }

    /// Record a failure found by custom logic.
    pub fn check(&mut self, condition: bool, field: &str, message: &str) -> &mut Self {
        if !condition {
            self.errors.add(field, message);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Keep ASCII digits only (national ID, phone).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}
