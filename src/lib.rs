// Module declarations
pub mod services;
pub mod types;
pub mod utils;

// Re-export the analytics boundary for consumers that only need the core
pub use services::core::analysis::metrics_analytics::{
    compute_analytics, AnalyticsConfig, AnalyticsSummary, MetricsAnalyticsService,
};
pub use services::core::ingestion::{MetricsApiClient, MetricsClientConfig, MetricsSource};
pub use types::HealthEventRecord;
pub use utils::{AtlasError, AtlasResult};
