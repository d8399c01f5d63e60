//! REST backend seam.
//!
//! The backend is an opaque collaborator: the core only knows collection
//! names, field names and the 2xx / 4xx / 5xx status classes. Transports
//! implement [`ClinicBackend`] with JSON values in and out; the typed
//! helpers in this module decode them into [`Resource`] types.

mod mock;

pub use mock::*;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shown when the response carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "The operation could not be completed. Please try again.";

/// Backend errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

impl BackendError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        match ResponseClass::from_status(status) {
            ResponseClass::ClientError => BackendError::Client { status, message },
            _ => BackendError::Server { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Client { status, .. } | BackendError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Banner text. Client and server errors surface the same way.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Client { message, .. } | BackendError::Server { message, .. } => {
                message.clone()
            }
            BackendError::Network(_) | BackendError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// HTTP status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    ClientError,
    ServerError,
}

impl ResponseClass {
    /// Anything outside 2xx and 4xx is treated as a server error.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => ResponseClass::Success,
            400..=499 => ResponseClass::ClientError,
            _ => ResponseClass::ServerError,
        }
    }
}

/// Best-effort user message from an error response body.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_json(&value),
        // Plain-text bodies are used as-is when short; HTML error pages are not.
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

fn message_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(message_from_json).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(map) => {
            for key in ["message", "error", "detail", "msg", "non_field_errors", "errors"] {
                if let Some(found) = map.get(key).and_then(message_from_json) {
                    return Some(found);
                }
            }
            // Field-keyed errors, e.g. {"email": ["already registered"]}
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| message_from_json(v).map(|m| format!("{}: {}", field, m)))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

/// JSON transport to the clinic backend.
///
/// Paths are relative to the API root, e.g. `patients` or `patients/12`.
/// Query parameters are passed unencoded; the transport encodes them.
/// An empty success body is returned as `Value::Null`.
pub trait ClinicBackend {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Value>;

    fn post(&self, path: &str, body: &Value) -> BackendResult<Value>;

    fn put(&self, path: &str, body: &Value) -> BackendResult<Value>;

    fn delete(&self, path: &str) -> BackendResult<()>;
}

/// A backend-owned record with an optional server id.
pub trait Resource: Serialize + DeserializeOwned + Clone {
    /// REST collection name.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;

    fn path_for(id: &str) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

/// Whether a save created a new record or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Strip a `{"data": ...}` envelope if the backend uses one.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub fn decode<T: DeserializeOwned>(value: Value) -> BackendResult<T> {
    Ok(serde_json::from_value(unwrap_envelope(value))?)
}

/// Fetch a whole collection.
pub fn list<R, B>(backend: &B) -> BackendResult<Vec<R>>
where
    R: Resource,
    B: ClinicBackend + ?Sized,
{
    let value = backend.get(R::COLLECTION, &[])?;
    match unwrap_envelope(value) {
        Value::Null => Ok(Vec::new()),
        // Paginated responses: {"results": [...]}
        Value::Object(mut map) if map.contains_key("results") => {
            decode(map.remove("results").unwrap_or(Value::Null))
        }
        other => decode(other),
    }
}

/// Fetch one record.
pub fn fetch<R, B>(backend: &B, id: &str) -> BackendResult<R>
where
    R: Resource,
    B: ClinicBackend + ?Sized,
{
    decode(backend.get(&R::path_for(id), &[])?)
}

/// Create or update, chosen by presence of an id.
///
/// Returns the server echo, or the sent record when the body is empty.
pub fn save<R, B>(backend: &B, record: &R) -> BackendResult<(R, SaveKind)>
where
    R: Resource,
    B: ClinicBackend + ?Sized,
{
    let body = serde_json::to_value(record)?;
    let (response, kind) = match record.id() {
        Some(id) => (backend.put(&R::path_for(id), &body)?, SaveKind::Updated),
        None => (backend.post(R::COLLECTION, &body)?, SaveKind::Created),
    };
    let echo = match unwrap_envelope(response) {
        Value::Null => record.clone(),
        value => decode(value)?,
    };
    Ok((echo, kind))
}

pub fn remove<R, B>(backend: &B, id: &str) -> BackendResult<()>
where
    R: Resource,
    B: ClinicBackend + ?Sized,
{
    backend.delete(&R::path_for(id))
}
