use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-file cost cache keyed by (path, mtime in ms since epoch).
///
/// A key is valid only while the file's modification time still matches: a
/// touched file lands under a fresh key and the stale entry is simply never
/// consulted again. Entries are never evicted or persisted; the map lives
/// and dies with the process.
#[derive(Debug, Clone, Default)]
pub struct CostCache {
    entries: HashMap<(PathBuf, u64), f64>,
}

impl CostCache {
    /// Cached cost for this exact file state, if any.
    pub fn cost_for(&self, path: &Path, mtime_ms: u64) -> Option<f64> {
        self.entries.get(&(path.to_path_buf(), mtime_ms)).copied()
    }

    pub fn record(&mut self, path: PathBuf, mtime_ms: u64, cost: f64) {
        self.entries.insert((path, mtime_ms), cost);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
