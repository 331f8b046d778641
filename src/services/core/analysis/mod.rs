// src/services/core/analysis/mod.rs

pub mod metrics_analytics;

pub use metrics_analytics::{compute_analytics, MetricsAnalyticsService};
