use serde_json::Value;
use thiserror::Error;

use crate::types::HealthEventRecord;
use crate::utils::helpers::{non_empty_string, parse_float_opt, safe_parse_float};

/// Errors raised when a metrics payload is not the expected GeoJSON shape.
///
/// Per-feature problems never error; they degrade to defaulted fields so a
/// single bad row cannot take down a whole refresh.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("expected a FeatureCollection, got type {0:?}")]
    NotAFeatureCollection(String),
    #[error("FeatureCollection is missing its features array")]
    MissingFeatures,
}

/// Converts a GeoJSON FeatureCollection from the health-metrics endpoint
/// into typed records.
///
/// Property coercion happens once, here, so everything downstream operates
/// over a closed shape: counts accept numbers or numeric strings (defaulting
/// to 0), the population stays `None` unless the source carries a usable
/// number, and blank names become `None`.
pub fn records_from_feature_collection(
    collection: &Value,
) -> Result<Vec<HealthEventRecord>, IngestError> {
    match collection.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(IngestError::NotAFeatureCollection(
                other.unwrap_or("null").to_string(),
            ))
        }
    }

    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or(IngestError::MissingFeatures)?;

    Ok(features
        .iter()
        .map(|feature| record_from_properties(&feature["properties"]))
        .collect())
}

fn record_from_properties(properties: &Value) -> HealthEventRecord {
    HealthEventRecord {
        facility_id: non_empty_string(&properties["facility_id"]),
        facility_name: properties["facility_name"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        lga_name: non_empty_string(&properties["lga_name"]),
        ward_name: non_empty_string(&properties["parentwardname"]),
        period: period_code(&properties["period"]),
        case_count: safe_parse_float(&properties["case_count"], 0.0),
        population: parse_float_opt(&properties["population"]),
    }
}

// Some exports serialize the period code as a bare number.
fn period_code(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
