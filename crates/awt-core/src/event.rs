//! Status events and their extraction from raw upstream records.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::status::{Status, StatusKind};

/// A single agent status change, as produced by the event router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    /// The agent the event belongs to.
    pub owner_id: String,
    /// The phone/device the agent is working on, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Platform status code, see [`StatusKind`].
    pub status_code: i64,
    pub status_name: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl StatusEvent {
    /// Builds an event for a known category with its canonical name.
    pub fn new(owner_id: impl Into<String>, kind: StatusKind, timestamp: i64) -> Self {
        Self {
            owner_id: owner_id.into(),
            device_id: None,
            status_code: kind.code(),
            status_name: kind.as_str().to_string(),
            timestamp,
        }
    }

    #[must_use]
    pub fn on_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Category of the event, `None` for codes this crate does not know.
    #[must_use]
    pub const fn kind(&self) -> Option<StatusKind> {
        StatusKind::from_code(self.status_code)
    }

    /// Resolves the status carried by this event.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.kind()
            .map(|kind| Status::new(kind, self.status_name.to_lowercase(), self.timestamp))
    }
}

/// Names of the raw record fields holding each logical event field.
///
/// Lets differently-shaped upstream records be ingested without code changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub owner_id: String,
    pub time: String,
    pub status_name: String,
    pub status_id: String,
    pub device_id: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            owner_id: "userId".to_string(),
            time: "statusTime".to_string(),
            status_name: "statusName".to_string(),
            status_id: "statusId".to_string(),
            device_id: "deviceId".to_string(),
        }
    }
}

impl FieldMapping {
    /// Decodes a raw JSON record into a [`StatusEvent`].
    ///
    /// Owner and device ids may be strings or integers, status ids integers or
    /// numeric strings, and timestamps epoch millis or RFC 3339 strings. A
    /// missing status name falls back to the canonical name of the status id.
    pub fn extract(&self, record: &Value) -> Result<StatusEvent, ExtractError> {
        let obj = record.as_object().ok_or(ExtractError::NotAnObject)?;

        let owner_id = field(obj, &self.owner_id)
            .ok_or_else(|| missing(&self.owner_id))
            .and_then(|v| id_string(&self.owner_id, v))?;
        if owner_id.is_empty() {
            return Err(invalid(&self.owner_id, "cannot be empty"));
        }

        let device_id = field(obj, &self.device_id)
            .map(|v| id_string(&self.device_id, v))
            .transpose()?
            .filter(|id| !id.is_empty());

        let status_name = field(obj, &self.status_name)
            .map(|v| {
                v.as_str()
                    .map(str::to_lowercase)
                    .ok_or_else(|| invalid(&self.status_name, "expected a string"))
            })
            .transpose()?;

        let status_code = match field(obj, &self.status_id) {
            Some(v) => status_code(&self.status_id, v)?,
            None => status_name
                .as_deref()
                .and_then(|name| name.parse::<StatusKind>().ok())
                .map(StatusKind::code)
                .ok_or_else(|| missing(&self.status_id))?,
        };

        let status_name = match status_name {
            Some(name) => name,
            None => StatusKind::from_code(status_code)
                .map(|kind| kind.as_str().to_string())
                .ok_or_else(|| missing(&self.status_name))?,
        };

        let timestamp = field(obj, &self.time)
            .ok_or_else(|| missing(&self.time))
            .and_then(|v| timestamp_millis(&self.time, v))?;

        Ok(StatusEvent {
            owner_id,
            device_id,
            status_code,
            status_name,
            timestamp,
        })
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn missing(field: &str) -> ExtractError {
    ExtractError::MissingField {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ExtractError {
    ExtractError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn id_string(name: &str, value: &Value) -> Result<String, ExtractError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(name, "expected a string or integer")),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "integral floats such as 4.0 are accepted as codes"
)]
fn status_code(name: &str, value: &Value) -> Result<i64, ExtractError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| invalid(name, format!("{n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| invalid(name, format!("{s:?} is not an integer"))),
        _ => Err(invalid(name, "expected an integer")),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "fractional epoch millis are truncated; out-of-range floats saturate"
)]
fn timestamp_millis(name: &str, value: &Value) -> Result<i64, ExtractError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| invalid(name, format!("{n} is not a timestamp"))),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return Ok(ms);
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| invalid(name, format!("{s:?}: {e}")))
        }
        _ => Err(invalid(name, "expected epoch millis or an RFC 3339 string")),
    }
}
