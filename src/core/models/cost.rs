use chrono::{DateTime, Utc};
use serde::Serialize;

/// Latest daily spend as published to consumers. The per-file cache behind
/// it never leaves the aggregator task.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct DailyCost {
    /// Dollars spent today, from local session logs
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
