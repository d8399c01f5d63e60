//! Blocking REST transport for the dental clinic backend.
//!
//! Implements [`ClinicBackend`] over `reqwest::blocking`, so every handler
//! in `dental-clinic-core` can run against the real API:
//!
//! ```text
//!   handler ──► ClinicBackend::post("patients", json)
//!                     │
//!                     ▼
//!   HttpBackend ──► POST {api_base_url}/patients/  (Authorization: Bearer ...)
//!                     │
//!          2xx ──► JSON body (empty body => Null)
//!          4xx ──► BackendError::Client { message }
//!          5xx ──► BackendError::Server { message }
//!   no connection ► BackendError::Network
//! ```

pub mod client;

pub use client::*;

pub use dental_clinic_core::backend::{BackendError, BackendResult, ClinicBackend};
