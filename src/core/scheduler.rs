use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::core::auth;
use crate::core::config::AppConfig;
use crate::core::cost::cache::CostCache;
use crate::core::cost::scanner;
use crate::core::models::cost::DailyCost;
use crate::core::models::usage::UsageSnapshot;
use crate::core::quota::poller;

/// Accepts only results newer than the last published one, so an overlapping
/// poll that finishes late cannot clobber a fresher snapshot.
#[derive(Debug, Default)]
struct SeqGate {
    last: u64,
}

impl SeqGate {
    fn accept(&mut self, seq: u64) -> bool {
        if seq > self.last {
            self.last = seq;
            true
        } else {
            false
        }
    }
}

/// Runs the two background cadences (quota poll, cost recompute) and
/// publishes their latest results through watch channels. Consumers read
/// immutable snapshots; `refresh` queues an immediate out-of-cycle run of
/// both tasks.
pub struct Scheduler {
    usage_rx: watch::Receiver<UsageSnapshot>,
    cost_rx: watch::Receiver<DailyCost>,
    usage_refresh: mpsc::Sender<()>,
    cost_refresh: mpsc::Sender<()>,
}

impl Scheduler {
    pub fn spawn(config: &AppConfig) -> Self {
        let (usage_tx, usage_rx) = watch::channel(UsageSnapshot::default());
        let (cost_tx, cost_rx) = watch::channel(DailyCost::default());
        let (usage_refresh, usage_refresh_rx) = mpsc::channel(4);
        let (cost_refresh, cost_refresh_rx) = mpsc::channel(4);

        tokio::spawn(usage_loop(
            config.intervals.usage_secs,
            usage_tx,
            usage_refresh_rx,
        ));
        tokio::spawn(cost_loop(
            config.intervals.cost_secs,
            config.log_dir(),
            cost_tx,
            cost_refresh_rx,
        ));

        Self {
            usage_rx,
            cost_rx,
            usage_refresh,
            cost_refresh,
        }
    }

    pub fn usage_receiver(&self) -> watch::Receiver<UsageSnapshot> {
        self.usage_rx.clone()
    }

    pub fn cost_receiver(&self) -> watch::Receiver<DailyCost> {
        self.cost_rx.clone()
    }

    /// Manual refresh. Dropped silently if a refresh is already queued.
    pub fn refresh(&self) {
        let _ = self.usage_refresh.try_send(());
        let _ = self.cost_refresh.try_send(());
    }
}

/// Quota cadence. Polls may overlap (a manual refresh racing a tick); each
/// in-flight poll carries a sequence number and stale completions are
/// discarded at publish time rather than cancelled.
async fn usage_loop(
    interval_secs: u64,
    usage_tx: watch::Sender<UsageSnapshot>,
    mut refresh_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let (done_tx, mut done_rx) = mpsc::channel::<(u64, UsageSnapshot)>(4);
    let mut seq: u64 = 0;
    let mut gate = SeqGate::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                seq += 1;
                spawn_poll(seq, done_tx.clone());
            }
            Some(()) = refresh_rx.recv() => {
                seq += 1;
                spawn_poll(seq, done_tx.clone());
            }
            Some((finished, snapshot)) = done_rx.recv() => {
                if gate.accept(finished) && usage_tx.send(snapshot).is_err() {
                    return;
                }
            }
        }
    }
}

fn spawn_poll(seq: u64, done_tx: mpsc::Sender<(u64, UsageSnapshot)>) {
    tokio::spawn(async move {
        let token = auth::get_oauth_token().await;
        let snapshot = poller::poll(token.as_deref()).await;
        let _ = done_tx.send((seq, snapshot)).await;
    });
}

/// Cost cadence. Recomputes run one at a time; the cache is owned by this
/// task alone and handed through each blocking scan, so no lock is needed.
async fn cost_loop(
    interval_secs: u64,
    log_dir: PathBuf,
    cost_tx: watch::Sender<DailyCost>,
    mut refresh_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cache = CostCache::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            Some(()) = refresh_rx.recv() => {}
        }

        let dir = log_dir.clone();
        let previous = std::mem::take(&mut cache);
        let Ok(state) =
            tokio::task::spawn_blocking(move || scanner::recompute(&dir, previous)).await
        else {
            continue;
        };
        cache = state.cache;

        let update = DailyCost {
            total: state.total,
            updated_at: Some(Utc::now()),
        };
        if cost_tx.send(update).is_err() {
            return;
        }
    }
}
