use chrono::{DateTime, Utc};
use serde::Serialize;

pub const FIVE_HOUR_WINDOW_SECS: f64 = 5.0 * 3600.0;
pub const SEVEN_DAY_WINDOW_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// One rolling quota window in display-ready form.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaWindow {
    /// Percentage of the window's cap consumed (0-100)
    pub utilization: f64,
    /// Countdown like "1d3h", "2h15m", "45m", "now"; empty when unknown
    pub reset_in: String,
    /// Seconds until the window resets
    pub reset_seconds: f64,
    /// Fixed length of the window in seconds
    pub window_seconds: f64,
}

impl QuotaWindow {
    pub fn five_hour() -> Self {
        Self::empty(FIVE_HOUR_WINDOW_SECS)
    }

    pub fn seven_day() -> Self {
        Self::empty(SEVEN_DAY_WINDOW_SECS)
    }

    fn empty(window_seconds: f64) -> Self {
        Self {
            utilization: 0.0,
            reset_in: String::new(),
            reset_seconds: 0.0,
            window_seconds,
        }
    }

    /// Fraction of the window already elapsed, clamped to [0, 1].
    pub fn elapsed_fraction(&self) -> f64 {
        (1.0 - self.reset_seconds / self.window_seconds).clamp(0.0, 1.0)
    }
}

/// Immutable result of one quota poll.
///
/// Invariant: when `error` is set, every other field stays at its default.
/// A snapshot is either a full success or a plain failure, never a hybrid.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub five_hour: QuotaWindow,
    pub seven_day: QuotaWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for UsageSnapshot {
    fn default() -> Self {
        Self {
            five_hour: QuotaWindow::five_hour(),
            seven_day: QuotaWindow::seven_day(),
            last_updated: None,
            error: None,
        }
    }
}

impl UsageSnapshot {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}
