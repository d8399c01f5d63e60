//! Client configuration with environment overrides.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::notify::DEFAULT_BANNER_TTL_MS;

pub const ENV_API_URL: &str = "DENTAL_API_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "DENTAL_API_TIMEOUT_SECS";
pub const ENV_BANNER_TTL_MS: &str = "DENTAL_BANNER_TTL_MS";
pub const ENV_EMAIL_DEBOUNCE_MS: &str = "DENTAL_EMAIL_DEBOUNCE_MS";
pub const ENV_TOKEN_DB: &str = "DENTAL_TOKEN_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// Root of the REST API, e.g. `http://localhost:8000/api`
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub banner_ttl_ms: i64,
    pub email_debounce_ms: i64,
    pub token_db_path: PathBuf,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            banner_ttl_ms: DEFAULT_BANNER_TTL_MS,
            email_debounce_ms: DEFAULT_DEBOUNCE_MS,
            token_db_path: PathBuf::from("dental-clinic-session.db"),
        }
    }
}

fn parsed<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(variable = name, value = %value, "Ignoring invalid numeric setting");
                default
            }
        },
    }
}

impl ClinicConfig {
    /// Defaults overridden by `DENTAL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_base_url = lookup(ENV_API_URL)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base_url);

        Self {
            api_base_url,
            request_timeout_secs: parsed(
                ENV_API_TIMEOUT_SECS,
                lookup(ENV_API_TIMEOUT_SECS),
                defaults.request_timeout_secs,
            ),
            banner_ttl_ms: parsed(ENV_BANNER_TTL_MS, lookup(ENV_BANNER_TTL_MS), defaults.banner_ttl_ms),
            email_debounce_ms: parsed(
                ENV_EMAIL_DEBOUNCE_MS,
                lookup(ENV_EMAIL_DEBOUNCE_MS),
                defaults.email_debounce_ms,
            ),
            token_db_path: lookup(ENV_TOKEN_DB)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.token_db_path),
        }
    }

    pub fn banner_ttl(&self) -> Duration {
        Duration::milliseconds(self.banner_ttl_ms.max(0))
    }

    pub fn email_debounce(&self) -> Duration {
        Duration::milliseconds(self.email_debounce_ms.max(0))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
