//! Per-accumulator configuration.

use serde::{Deserialize, Serialize};

use crate::event::FieldMapping;

/// Options controlling validation and raw-record extraction.
///
/// Field names use the upstream feed's defaults (`statusTime`, `statusName`,
/// `statusId`, `deviceId`, `userId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorOptions {
    /// Record field holding the agent id.
    pub owner_id_field_name: String,
    /// Record field holding the event timestamp.
    pub time_field_name: String,
    /// Record field holding the status name.
    pub status_name_field_name: String,
    /// Record field holding the numeric status code.
    pub status_id_field_name: String,
    /// Record field holding the device id.
    pub device_id_field_name: String,
    /// Strict mode: reject owner, chronology and device violations.
    /// When false those checks are skipped entirely.
    pub throws: bool,
    /// Reject device changes while logged in (strict mode only).
    pub check_device_id: bool,
}

impl Default for AccumulatorOptions {
    fn default() -> Self {
        let fields = FieldMapping::default();
        Self {
            owner_id_field_name: fields.owner_id,
            time_field_name: fields.time,
            status_name_field_name: fields.status_name,
            status_id_field_name: fields.status_id,
            device_id_field_name: fields.device_id,
            throws: true,
            check_device_id: true,
        }
    }
}

impl AccumulatorOptions {
    /// Lenient options: every validation check is skipped.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            throws: false,
            ..Self::default()
        }
    }

    /// Resolves the configured field names into an extraction strategy.
    #[must_use]
    pub fn field_mapping(&self) -> FieldMapping {
        FieldMapping {
            owner_id: self.owner_id_field_name.clone(),
            time: self.time_field_name.clone(),
            status_name: self.status_name_field_name.clone(),
            status_id: self.status_id_field_name.clone(),
            device_id: self.device_id_field_name.clone(),
        }
    }
}
