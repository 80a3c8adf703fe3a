use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::models::usage::{QuotaWindow, UsageSnapshot};
use crate::core::quota::window;

const USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";
const OAUTH_BETA_FLAG: &str = "oauth-2025-04-20";
const USER_AGENT: &str = concat!("tokenbar/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Deserialize)]
struct WindowRaw {
    utilization: Option<f64>,
    resets_at: Option<String>,
}

#[derive(Deserialize)]
struct UsageResponse {
    five_hour: Option<WindowRaw>,
    seven_day: Option<WindowRaw>,
}

/// One poll of the quota endpoint. Infallible at the type level: every
/// failure mode collapses into a snapshot carrying only `error`, so callers
/// always publish something self-consistent. Safe to run concurrently with
/// itself; each call produces an independent snapshot.
pub async fn poll(token: Option<&str>) -> UsageSnapshot {
    let Some(token) = token else {
        return UsageSnapshot::failed("no credential");
    };
    match fetch(token).await {
        Ok(snapshot) => snapshot,
        Err(e) => UsageSnapshot::failed(format!("{:#}", e)),
    }
}

async fn fetch(token: &str) -> Result<UsageSnapshot> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(USAGE_URL)
        .header("Authorization", format!("Bearer {}", token))
        .header("Accept", "application/json")
        .header("anthropic-beta", OAUTH_BETA_FLAG)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .context("Failed to reach quota endpoint")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {}", status.as_u16());
    }

    let data: UsageResponse = response
        .json()
        .await
        .context("Failed to parse quota response")?;

    Ok(snapshot_from_response(data, Utc::now()))
}

/// A window absent from the payload stays at its zero default; that is not
/// an error. `last_updated` is stamped only on this success path.
fn snapshot_from_response(data: UsageResponse, now: DateTime<Utc>) -> UsageSnapshot {
    let mut snapshot = UsageSnapshot {
        last_updated: Some(now),
        ..UsageSnapshot::default()
    };
    if let Some(raw) = data.five_hour {
        fill_window(&mut snapshot.five_hour, raw, now);
    }
    if let Some(raw) = data.seven_day {
        fill_window(&mut snapshot.seven_day, raw, now);
    }
    snapshot
}

fn fill_window(target: &mut QuotaWindow, raw: WindowRaw, now: DateTime<Utc>) {
    target.utilization = raw.utilization.unwrap_or(0.0);
    if let Some(resets_at) = raw.resets_at.as_deref() {
        let (reset_in, reset_seconds) = window::normalize(resets_at, now);
        target.reset_in = reset_in;
        target.reset_seconds = reset_seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn poll_without_credential_reports_error() {
        let snapshot = poll(None).await;
        assert_eq!(snapshot.error.as_deref(), Some("no credential"));
        assert!(snapshot.five_hour.utilization.abs() < f64::EPSILON);
        assert!(snapshot.last_updated.is_none());
    }

    #[test]
    fn deserialize_full_response() {
        let json = r#"{
            "five_hour": { "utilization": 28.0, "resets_at": "2023-11-14T23:28:38Z" },
            "seven_day": { "utilization": 59.5, "resets_at": "2023-11-20T17:00:00Z" }
        }"#;
        let data: UsageResponse = serde_json::from_str(json).unwrap();
        assert!(data.five_hour.is_some());
        assert!(data.seven_day.is_some());
    }

    #[test]
    fn deserialize_tolerates_unknown_fields_and_missing_windows() {
        let json = r#"{ "seven_day": { "utilization": 12.0 }, "plan": "pro" }"#;
        let data: UsageResponse = serde_json::from_str(json).unwrap();
        assert!(data.five_hour.is_none());
        let seven_day = data.seven_day.unwrap();
        assert!((seven_day.utilization.unwrap() - 12.0).abs() < f64::EPSILON);
        assert!(seven_day.resets_at.is_none());
    }

    #[test]
    fn snapshot_populates_both_windows() {
        let json = r#"{
            "five_hour": { "utilization": 28.0, "resets_at": "2023-11-14T23:28:38Z" },
            "seven_day": { "utilization": 59.5, "resets_at": "2023-11-15T22:13:20Z" }
        }"#;
        let data: UsageResponse = serde_json::from_str(json).unwrap();
        let now = at(1_700_000_000);
        let snapshot = snapshot_from_response(data, now);

        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.last_updated, Some(now));
        assert!((snapshot.five_hour.utilization - 28.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.five_hour.reset_in, "1h15m");
        assert!((snapshot.five_hour.reset_seconds - 4_518.0).abs() < 1e-9);
        assert!((snapshot.seven_day.utilization - 59.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.seven_day.reset_in, "1d0h");
    }

    #[test]
    fn snapshot_leaves_absent_window_at_default() {
        let json = r#"{ "five_hour": { "utilization": 10.0 } }"#;
        let data: UsageResponse = serde_json::from_str(json).unwrap();
        let snapshot = snapshot_from_response(data, at(1_700_000_000));

        assert!((snapshot.five_hour.utilization - 10.0).abs() < f64::EPSILON);
        assert!(snapshot.five_hour.reset_in.is_empty());
        assert!(snapshot.seven_day.utilization.abs() < f64::EPSILON);
        assert!(snapshot.seven_day.reset_in.is_empty());
    }

    #[test]
    fn snapshot_invalid_reset_timestamp_keeps_empty_countdown() {
        let json = r#"{ "five_hour": { "utilization": 10.0, "resets_at": "garbage" } }"#;
        let data: UsageResponse = serde_json::from_str(json).unwrap();
        let snapshot = snapshot_from_response(data, at(1_700_000_000));
        assert!(snapshot.five_hour.reset_in.is_empty());
        assert!(snapshot.five_hour.reset_seconds.abs() < f64::EPSILON);
    }
}
