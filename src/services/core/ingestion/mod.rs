// src/services/core/ingestion/mod.rs

pub mod geojson;
pub mod metrics_client;

pub use geojson::records_from_feature_collection;
pub use metrics_client::{MetricsApiClient, MetricsClientConfig, MetricsSource};
