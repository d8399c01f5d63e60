//! In-memory backend for tests and offline demos.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::{json, Value};

use super::{BackendError, BackendResult, ClinicBackend};

/// HTTP method of a recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Collection-per-path backend that assigns ids and timestamps like a
/// real server and records every call it receives.
#[derive(Debug, Default)]
pub struct MockBackend {
    collections: RefCell<BTreeMap<String, Vec<Value>>>,
    routes: RefCell<HashMap<(Method, String), Value>>,
    failures: RefCell<VecDeque<BackendError>>,
    calls: RefCell<Vec<RecordedCall>>,
    next_id: Cell<u64>,
}

fn not_found(path: &str) -> BackendError {
    BackendError::Client {
        status: 404,
        message: format!("Not found: {}", path),
    }
}

fn id_of(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_matches(record: &Value, key: &str, expected: &str) -> bool {
    match record.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => b.to_string() == expected,
        _ => false,
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Key a GET is recorded and routed under: `path?k=v&k2=v2`, unencoded.
fn route_key(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, pairs.join("&"))
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, assigning an id when it has none. Returns the id.
    pub fn insert(&self, collection: &str, mut record: Value) -> String {
        let id = match id_of(&record) {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                if let Value::Object(map) = &mut record {
                    map.insert("id".to_string(), json!(id.clone()));
                }
                id
            }
        };
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .push(record);
        id
    }

    /// Answer `method path` with a fixed body instead of collection logic.
    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.routes
            .borrow_mut()
            .insert((method, path.to_string()), body);
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: BackendError) {
        self.failures.borrow_mut().push_back(error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls with this method whose path starts with `prefix`.
    pub fn count(&self, method: Method, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == method && c.path.starts_with(prefix))
            .count()
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn allocate_id(&self) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id.to_string()
    }

    fn begin(&self, method: Method, path: &str, body: Option<&Value>) -> BackendResult<Option<Value>> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        if let Some(error) = self.failures.borrow_mut().pop_front() {
            return Err(error);
        }
        Ok(self.routes.borrow().get(&(method, path.to_string())).cloned())
    }

    fn stamp(record: &mut Value, id: &str) {
        if let Value::Object(map) = record {
            map.insert("id".to_string(), json!(id));
            map.insert("updated_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
        }
    }
}

impl ClinicBackend for MockBackend {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Value> {
        if let Some(canned) = self.begin(Method::Get, &route_key(path, query), None)? {
            return Ok(canned);
        }
        let collections = self.collections.borrow();
        match segments(path).as_slice() {
            [collection] => {
                let records = collections.get(*collection).cloned().unwrap_or_default();
                let filtered: Vec<Value> = records
                    .into_iter()
                    .filter(|r| query.iter().all(|(k, v)| field_matches(r, k, v)))
                    .collect();
                Ok(Value::Array(filtered))
            }
            [collection, id] => collections
                .get(*collection)
                .and_then(|records| records.iter().find(|r| id_of(r).as_deref() == Some(*id)))
                .cloned()
                .ok_or_else(|| not_found(path)),
            _ => Err(not_found(path)),
        }
    }

    fn post(&self, path: &str, body: &Value) -> BackendResult<Value> {
        if let Some(canned) = self.begin(Method::Post, path, Some(body))? {
            return Ok(canned);
        }
        let parts = segments(path);
        let [collection] = parts.as_slice() else {
            return Err(not_found(path));
        };
        let mut record = body.clone();
        let id = self.allocate_id();
        Self::stamp(&mut record, &id);
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn put(&self, path: &str, body: &Value) -> BackendResult<Value> {
        if let Some(canned) = self.begin(Method::Put, path, Some(body))? {
            return Ok(canned);
        }
        let parts = segments(path);
        let [collection, id] = parts.as_slice() else {
            return Err(not_found(path));
        };
        let mut collections = self.collections.borrow_mut();
        let slot = collections
            .get_mut(*collection)
            .and_then(|records| records.iter_mut().find(|r| id_of(r).as_deref() == Some(*id)))
            .ok_or_else(|| not_found(path))?;
        let mut record = body.clone();
        Self::stamp(&mut record, id);
        *slot = record.clone();
        Ok(record)
    }

    fn delete(&self, path: &str) -> BackendResult<()> {
        if self.begin(Method::Delete, path, None)?.is_some() {
            return Ok(());
        }
        let parts = segments(path);
        let [collection, id] = parts.as_slice() else {
            return Err(not_found(path));
        };
        let mut collections = self.collections.borrow_mut();
        let records = collections.get_mut(*collection).ok_or_else(|| not_found(path))?;
        let before = records.len();
        records.retain(|r| id_of(r).as_deref() != Some(*id));
        if records.len() == before {
            Err(not_found(path))
        } else {
            Ok(())
        }
    }
}
