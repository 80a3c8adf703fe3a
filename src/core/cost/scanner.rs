use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDate};

use crate::core::cost::cache::CostCache;
use crate::core::cost::parser;
use crate::core::cost::pricing;

/// Outcome of one aggregation pass. The cache is handed back to the caller
/// and threaded into the next pass; `parsed_files`/`reused_files` are
/// diagnostics only.
#[derive(Debug, Default)]
pub struct DailyCostState {
    pub total: f64,
    pub cache: CostCache,
    pub parsed_files: usize,
    pub reused_files: usize,
}

/// Sum today's spend from the session logs under `log_dir`.
///
/// "Today" is the local calendar date at the moment of the call; files are
/// attributed to it by modification time, never by in-file timestamps. Files
/// whose (path, mtime) already appear in `previous` are reused without a
/// read. Entries for files no longer modified today are carried forward
/// untouched, so a later pass within the same day stays cheap.
pub fn recompute(log_dir: &Path, previous: CostCache) -> DailyCostState {
    let today = Local::now().date_naive();
    recompute_for_date(log_dir, previous, today)
}

fn recompute_for_date(log_dir: &Path, previous: CostCache, today: NaiveDate) -> DailyCostState {
    let mut state = DailyCostState {
        cache: previous,
        ..DailyCostState::default()
    };

    let mut files: Vec<PathBuf> = Vec::new();
    collect_log_files(log_dir, &mut files);

    for path in files {
        let Some(mtime) = file_mtime(&path) else {
            continue;
        };
        if local_date(mtime) != today {
            continue;
        }

        let mtime_ms = mtime_millis(mtime);
        if let Some(cost) = state.cache.cost_for(&path, mtime_ms) {
            state.total += cost;
            state.reused_files += 1;
            continue;
        }

        let cost = file_cost(&path);
        state.cache.record(path, mtime_ms, cost);
        state.total += cost;
        state.parsed_files += 1;
    }

    state
}

/// Recursively gather `.jsonl` files, skipping hidden entries. A missing or
/// unreadable directory yields nothing.
fn collect_log_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            collect_log_files(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            files.push(path);
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn local_date(mtime: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(mtime).date_naive()
}

fn mtime_millis(mtime: SystemTime) -> u64 {
    mtime
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Price every usage line in one file. An unreadable file contributes zero.
fn file_cost(path: &Path) -> f64 {
    let Ok(file) = std::fs::File::open(path) else {
        return 0.0;
    };
    let reader = BufReader::new(file);

    let mut cost = 0.0;
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        if let Some(record) = parser::parse_line(&line) {
            cost += pricing::record_cost(&record);
        }
    }
    cost
}
