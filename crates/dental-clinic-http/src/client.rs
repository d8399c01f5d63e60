//! HTTP client for the clinic REST API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

use dental_clinic_core::backend::{BackendError, BackendResult, ClinicBackend};
use dental_clinic_core::{AuthToken, ClinicConfig};

/// Errors building the transport itself.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

pub type HttpResult<T> = Result<T, HttpError>;

impl From<HttpError> for BackendError {
    fn from(e: HttpError) -> Self {
        BackendError::Network(e.to_string())
    }
}

/// REST backend reached over HTTP.
pub struct HttpBackend {
    base_url: Url,
    client: Client,
    timeout_secs: u64,
    bearer: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> HttpResult<Self> {
        let raw = base_url.trim().trim_end_matches('/');
        let base_url =
            Url::parse(raw).map_err(|e| HttpError::InvalidBaseUrl(format!("{}: {}", raw, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidBaseUrl(raw.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            client,
            timeout_secs,
            bearer: None,
        })
    }

    pub fn from_config(config: &ClinicConfig) -> HttpResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout_secs)
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: &AuthToken) -> Self {
        self.set_token(Some(token));
        self
    }

    pub fn set_token(&mut self, token: Option<&AuthToken>) {
        self.bearer = token.map(AuthToken::bearer);
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an API-relative path plus query pairs.
    ///
    /// Each path segment is percent-encoded and the result ends with a slash.
    pub fn url_for(&self, path: &str, query: &[(&str, &str)]) -> HttpResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()))
            .push("");
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(bearer) => request.header(reqwest::header::AUTHORIZATION, bearer),
            None => request,
        }
    }

    fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> BackendResult<Value> {
        tracing::debug!(method, url = %url, "Backend request");

        let response = self
            .authorized(request)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(method, url = %url, status = status.as_u16(), "Backend request failed");
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            tracing::warn!(base_url = %self.base_url, "Backend unreachable");
            BackendError::Network(format!("Cannot connect to {}", self.base_url))
        } else if e.is_timeout() {
            BackendError::Network(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

impl ClinicBackend for HttpBackend {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Value> {
        let url = self.url_for(path, query)?;
        self.send("GET", &url, self.client.get(url.clone()))
    }

    fn post(&self, path: &str, body: &Value) -> BackendResult<Value> {
        let url = self.url_for(path, &[])?;
        self.send("POST", &url, self.client.post(url.clone()).json(body))
    }

    fn put(&self, path: &str, body: &Value) -> BackendResult<Value> {
        let url = self.url_for(path, &[])?;
        self.send("PUT", &url, self.client.put(url.clone()).json(body))
    }

    fn delete(&self, path: &str) -> BackendResult<()> {
        let url = self.url_for(path, &[])?;
        self.send("DELETE", &url, self.client.delete(url.clone())).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new("http://localhost:8000/api/", 5).unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:8000/api");
        assert_eq!(
            backend.url_for("patients", &[]).unwrap().as_str(),
            "http://localhost:8000/api/patients/"
        );
        assert_eq!(
            backend.url_for("/patients/12", &[]).unwrap().as_str(),
            "http://localhost:8000/api/patients/12/"
        );
        assert_eq!(
            backend.url_for("odontograms", &[("patient_id", "7")]).unwrap().as_str(),
            "http://localhost:8000/api/odontograms/?patient_id=7"
        );
    }

    #[test]
    fn test_host_root_base() {
        let backend = HttpBackend::new("http://127.0.0.1:8000", 5).unwrap();
        assert_eq!(
            backend.url_for("patients", &[]).unwrap().as_str(),
            "http://127.0.0.1:8000/patients/"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let backend = HttpBackend::new("http://localhost:8000/api", 5).unwrap();
        assert_eq!(
            backend.url_for("patients/a b?x", &[]).unwrap().as_str(),
            "http://localhost:8000/api/patients/a%20b%3Fx/"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let backend = HttpBackend::new("http://localhost:8000/api", 5).unwrap();
        let url = backend
            .url_for("auth/email-exists", &[("email", "a+b@clinic.com"), ("q", "x&y")])
            .unwrap();
        assert_eq!(url.query(), Some("email=a%2Bb%40clinic.com&q=x%26y"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("email".to_string(), "a+b@clinic.com".to_string()));
        assert_eq!(pairs[1], ("q".to_string(), "x&y".to_string()));
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            HttpBackend::new("localhost:8000", 5),
            Err(HttpError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("ftp://clinic.example.com/api", 5),
            Err(HttpError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("https://bad host name/api", 5),
            Err(HttpError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:front-desk@clinic.com", 5),
            Err(HttpError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ClinicConfig {
            api_base_url: "https://clinic.example.com/api".into(),
            request_timeout_secs: 3,
            ..ClinicConfig::default()
        };
        let backend = HttpBackend::from_config(&config).unwrap();
        assert_eq!(backend.timeout_secs, 3);
        assert!(backend.bearer.is_none());

        let backend = backend.with_token(&AuthToken::new("abc"));
        assert_eq!(backend.bearer.as_deref(), Some("Bearer abc"));
    }
}
