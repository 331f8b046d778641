use serde::{Deserialize, Serialize};

/// One facility-period observation as delivered by the health-metrics API.
///
/// Field values arrive already coerced by the ingestion boundary: counts are
/// plain numbers, absent or unusable source values are `None`. The analytics
/// service never mutates a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEventRecord {
    pub facility_id: Option<String>,
    pub facility_name: String,
    pub lga_name: Option<String>,
    pub ward_name: Option<String>,
    /// DHIS2-style period code: `YYYY` optionally followed by `MM`.
    pub period: String,
    pub case_count: f64,
    /// LGA-level population joined onto the record, when the source has one.
    pub population: Option<f64>,
}

impl HealthEventRecord {
    /// Identifier used to tell facilities apart within an LGA.
    ///
    /// Falls back to the facility name when no id is present; returns `None`
    /// when neither is usable, so anonymous rows never collapse into a
    /// shared phantom facility.
    pub fn facility_key(&self) -> Option<&str> {
        match self.facility_id.as_deref() {
            Some(id) if !id.is_empty() => Some(id),
            _ if !self.facility_name.is_empty() => Some(self.facility_name.as_str()),
            _ => None,
        }
    }
}
