use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use tokio::sync::{mpsc, watch};

use crate::cli::output::OutputOptions;
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::models::cost::DailyCost;
use crate::core::models::usage::UsageSnapshot;
use crate::core::scheduler::Scheduler;

/// RAII guard that restores terminal state on drop (even on panic).
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        io::stdout().execute(cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = io::stdout().execute(cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Live monitor. The scheduler runs its two cadences in the background; this
/// task only re-renders published snapshots and feeds refresh/quit back in.
pub async fn run(opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let scheduler = Scheduler::spawn(&config);
    let mut usage_rx = scheduler.usage_receiver();
    let mut cost_rx = scheduler.cost_receiver();

    if !io::stdin().is_terminal() {
        return stream_plain(&mut usage_rx, &mut cost_rx, opts).await;
    }

    let _guard = RawModeGuard::enable()?;
    let mut key_rx = spawn_key_reader();

    draw(&usage_rx, &cost_rx, opts.use_color)?;
    loop {
        tokio::select! {
            changed = usage_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&usage_rx, &cost_rx, opts.use_color)?;
            }
            changed = cost_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&usage_rx, &cost_rx, opts.use_color)?;
            }
            Some(key) = key_rx.recv() => {
                match (key.code, key.modifiers) {
                    (KeyCode::Char('c'), KeyModifiers::CONTROL)
                    | (KeyCode::Char('q'), _)
                    | (KeyCode::Esc, _) => break,
                    (KeyCode::Char('r'), _) => scheduler.refresh(),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Fallback for piped output: one rendered block per update, no key handling.
async fn stream_plain(
    usage_rx: &mut watch::Receiver<UsageSnapshot>,
    cost_rx: &mut watch::Receiver<DailyCost>,
    opts: &OutputOptions,
) -> Result<()> {
    loop {
        tokio::select! {
            changed = usage_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            changed = cost_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        let snapshot = usage_rx.borrow().clone();
        let cost = *cost_rx.borrow();
        println!("{}\n", renderer::render(&snapshot, Some(&cost), opts.use_color));
    }
}

fn draw(
    usage_rx: &watch::Receiver<UsageSnapshot>,
    cost_rx: &watch::Receiver<DailyCost>,
    use_color: bool,
) -> io::Result<()> {
    let snapshot = usage_rx.borrow().clone();
    let cost = *cost_rx.borrow();
    let block = renderer::render(&snapshot, Some(&cost), use_color);

    let mut stdout = io::stdout();
    stdout
        .execute(terminal::Clear(ClearType::All))?
        .execute(cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "{}\r\n\r\n  {}\r\n",
        block.replace('\n', "\r\n"),
        "r refresh · q quit".dimmed()
    )?;
    stdout.flush()
}

/// Blocking key reads on a plain thread, bridged into the async loop.
fn spawn_key_reader() -> mpsc::Receiver<event::KeyEvent> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || loop {
        if tx.is_closed() {
            return;
        }
        if event::poll(Duration::from_millis(250)).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press && tx.blocking_send(key).is_err() {
                    return;
                }
            }
        }
    });
    rx
}
