//! Domain models for the dental clinic.

mod appointment;
mod auth;
mod clinical;
mod finance;
mod patient;

pub use appointment::*;
pub use auth::*;
pub use clinical::*;
pub use finance::*;
pub use patient::*;

use serde::{Deserialize, Deserializer};

/// Accept backend ids sent either as strings or as numbers.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

/// Treat `None` and blank strings alike.
pub(crate) fn blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("").trim()
}
