//! Loading and saving charts through the backend.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::{AbsentTeeth, ChartModel};
use crate::backend::{self, BackendResult, ClinicBackend, SaveKind};
use crate::notify::Notifications;

/// Just the absent set of a stored chart of either kind.
#[derive(Debug, Default, Deserialize)]
struct AbsentOnly {
    #[serde(default)]
    absent: AbsentTeeth,
}

/// Fetch the stored chart document of a patient, if any.
///
/// Accepts a single object, a list (the most recent entry wins) or a
/// paginated `{"results": [...]}` body. A 404 means nothing is stored.
pub fn fetch_chart_document<D, B>(backend: &B, resource: &str, patient_id: &str) -> BackendResult<Option<D>>
where
    D: DeserializeOwned,
    B: ClinicBackend + ?Sized,
{
    let value = match backend.get(resource, &[("patient_id", patient_id)]) {
        Ok(value) => backend::unwrap_envelope(value),
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };

    let value = match value {
        Value::Object(mut map) if map.contains_key("results") => map.remove("results").unwrap_or(Value::Null),
        other => other,
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(mut items) => match items.pop() {
            Some(last) => Ok(Some(backend::decode(last)?)),
            None => Ok(None),
        },
        other => Ok(Some(backend::decode(other)?)),
    }
}

/// Load a patient's chart.
///
/// A missing chart yields a blank one. The absent set is the union of the
/// stored chart's and the companion chart's; a companion that cannot be
/// fetched only loses its contribution.
pub fn load_chart<C, B>(backend: &B, patient_id: &str) -> BackendResult<C>
where
    C: ChartModel,
    B: ClinicBackend + ?Sized,
{
    let mut chart = C::blank(patient_id);
    if let Some(document) = fetch_chart_document::<C::Document, B>(backend, C::RESOURCE, patient_id)? {
        chart.replace_with(document);
    }

    match fetch_chart_document::<AbsentOnly, B>(backend, C::COMPANION, patient_id) {
        Ok(Some(companion)) => chart.merge_absent(&companion.absent),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                resource = C::COMPANION,
                patient_id,
                error = %e,
                "Companion chart unavailable, absence not merged"
            );
        }
    }

    tracing::debug!(
        resource = C::RESOURCE,
        patient_id,
        stored = chart.server_id().is_some(),
        absent = chart.absent_teeth().len(),
        "Chart loaded"
    );
    Ok(chart)
}

/// Send the whole chart as one document.
///
/// On success the local state is replaced by the server echo. On failure
/// the local state is left as it was and an error banner is pushed.
pub fn save_chart<C, B>(
    chart: &mut C,
    backend: &B,
    notices: &mut Notifications,
    now: DateTime<Utc>,
) -> BackendResult<SaveKind>
where
    C: ChartModel,
    B: ClinicBackend + ?Sized,
{
    match send_document(chart, backend) {
        Ok((echo, kind)) => {
            chart.replace_with(echo);
            tracing::info!(
                resource = C::RESOURCE,
                patient_id = chart.patient_id(),
                id = ?chart.server_id(),
                absent = chart.absent_teeth().len(),
                ?kind,
                "Chart saved"
            );
            notices.success(format!("{} saved", C::LABEL), now);
            Ok(kind)
        }
        Err(e) => {
            tracing::warn!(
                resource = C::RESOURCE,
                patient_id = chart.patient_id(),
                error = %e,
                "Chart save failed"
            );
            notices.error(e.user_message(), now);
            Err(e)
        }
    }
}

fn send_document<C, B>(chart: &C, backend: &B) -> BackendResult<(C::Document, SaveKind)>
where
    C: ChartModel,
    B: ClinicBackend + ?Sized,
{
    let document = chart.to_document();
    let body = serde_json::to_value(&document)?;
    let (response, kind) = match chart.server_id() {
        Some(id) => (backend.put(&format!("{}/{}", C::RESOURCE, id), &body)?, SaveKind::Updated),
        None => (backend.post(C::RESOURCE, &body)?, SaveKind::Created),
    };
    let echo = match backend::unwrap_envelope(response) {
        Value::Null => document,
        value => backend::decode(value)?,
    };
    Ok((echo, kind))
}
