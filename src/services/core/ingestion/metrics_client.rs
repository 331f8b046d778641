use async_trait::async_trait;
use url::Url;

use super::geojson::records_from_feature_collection;
use crate::types::HealthEventRecord;
use crate::utils::logger::Logger;
use crate::utils::{AtlasError, AtlasResult};

/// Configuration for the health-metrics API client.
#[derive(Debug, Clone)]
pub struct MetricsClientConfig {
    /// Portal API root, e.g. `https://portal.example.org/api`.
    pub base_url: String,
}

impl Default for MetricsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
        }
    }
}

/// Anything that can produce health-event records for a metric.
///
/// The dashboards consume this trait rather than the HTTP client directly,
/// so tests drive the analytics pipeline from fixtures.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_metric(&self, metric: &str) -> AtlasResult<Vec<HealthEventRecord>>;
}

/// HTTP client for the portal's `GET /health-metrics/:metric` endpoint.
pub struct MetricsApiClient {
    config: MetricsClientConfig,
    http: reqwest::Client,
    logger: Logger,
}

impl MetricsApiClient {
    pub fn new(config: MetricsClientConfig, logger: Logger) -> AtlasResult<Self> {
        // Fail configuration problems up front rather than on first fetch.
        Url::parse(&config.base_url)
            .map_err(|e| AtlasError::config_error(format!("invalid base URL: {}", e)))?;
        Ok(Self {
            config,
            http: reqwest::Client::new(),
            logger,
        })
    }

    fn metric_url(&self, metric: &str) -> AtlasResult<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AtlasError::config_error("base URL cannot carry path segments"))?
            .pop_if_empty()
            .push("health-metrics")
            .push(metric);
        Ok(url)
    }
}

#[async_trait]
impl MetricsSource for MetricsApiClient {
    async fn fetch_metric(&self, metric: &str) -> AtlasResult<Vec<HealthEventRecord>> {
        let url = self.metric_url(metric)?;
        self.logger
            .debug(&format!("Fetching health metrics from {}", url));

        let response = self.http.get(url).send().await.map_err(|e| {
            AtlasError::network_error(format!("health-metrics request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AtlasError::api_error(format!(
                "health-metrics endpoint returned {} for metric {}",
                response.status(),
                metric
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AtlasError::parse_error(format!("invalid metrics body: {}", e)))?;
        let records = records_from_feature_collection(&body)?;

        self.logger.info(&format!(
            "Fetched {} records for metric {}",
            records.len(),
            metric
        ));
        Ok(records)
    }
}
