use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::auth;
use crate::core::config::AppConfig;
use crate::core::cost::cache::CostCache;
use crate::core::cost::scanner;
use crate::core::models::cost::DailyCost;
use crate::core::models::usage::UsageSnapshot;
use crate::core::quota::poller;

#[derive(Serialize)]
struct UsagePayload<'a> {
    #[serde(flatten)]
    usage: &'a UsageSnapshot,
    daily_cost: DailyCost,
}

/// One-shot fetch: quota poll and cost scan run concurrently, then a single
/// render to stdout.
pub async fn run(opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let log_dir = config.log_dir();

    let cost_handle =
        tokio::task::spawn_blocking(move || scanner::recompute(&log_dir, CostCache::default()));

    // Spinner on stderr (text mode only)
    let spinner = if matches!(opts.format, OutputFormat::Text) {
        Some(tokio::spawn(async {
            let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let mut i = 0usize;
            loop {
                eprint!("\r {} Fetching usage data...", frames[i % frames.len()]);
                i = i.wrapping_add(1);
                tokio::time::sleep(std::time::Duration::from_millis(80)).await;
            }
        }))
    } else {
        None
    };

    let token = auth::get_oauth_token().await;
    let snapshot = poller::poll(token.as_deref()).await;
    let state = cost_handle.await?;

    if let Some(s) = spinner {
        s.abort();
        eprint!("\r\x1b[2K");
    }

    if opts.verbose {
        eprintln!(
            "scan: {} file(s) parsed, {} from cache, {} cache entries",
            state.parsed_files,
            state.reused_files,
            state.cache.len()
        );
    }

    let daily_cost = DailyCost {
        total: state.total,
        updated_at: Some(Utc::now()),
    };

    match opts.format {
        OutputFormat::Text => {
            println!(
                "{}",
                renderer::render(&snapshot, Some(&daily_cost), opts.use_color)
            );
        }
        OutputFormat::Json => {
            let payload = UsagePayload {
                usage: &snapshot,
                daily_cost,
            };
            let json = if opts.pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
