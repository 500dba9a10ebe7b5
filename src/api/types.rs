//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::storage::LogStats;
use crate::{LogEntry, MetricSnapshot, Severity};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub components: HealthComponents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthComponents {
    pub metrics_collector: bool,
    pub log_monitor: bool,
}

/// Where the returned metrics came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsKind {
    /// One snapshot taken for this request
    Current,
    /// Stored samples, oldest first
    Historical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Vec<MetricSnapshot>,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: MetricsKind,
}

/// Filter echoed back with a log query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFilter {
    pub level: Option<Severity>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
    pub count: usize,
    pub filter: LogFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStatsResponse {
    pub statistics: LogStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub configuration: Config,
    pub timestamp: DateTime<Utc>,
}
