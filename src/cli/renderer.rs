use chrono::Local;
use colored::{control, ColoredString, Colorize};

use crate::core::formatter::{format_cost, format_remaining_percent, format_usage_bar};
use crate::core::models::cost::DailyCost;
use crate::core::models::usage::{QuotaWindow, UsageSnapshot};

const BAR_WIDTH: usize = 12;

/// Render a snapshot and today's cost as a colored (or plain) block.
///
/// Layout:
/// ```text
///  Claude usage (13:05:42)
///   5-hour   72% remaining [████████░░░░]
///            Resets in 2h15m
///   7-day    41% remaining [█████░░░░░░░]
///            Resets in 3d4h
///   Today    $12.34
/// ```
pub fn render(snapshot: &UsageSnapshot, cost: Option<&DailyCost>, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    let header = match snapshot.last_updated {
        Some(at) => format!(
            " Claude usage ({})",
            at.with_timezone(&Local).format("%H:%M:%S")
        ),
        None => " Claude usage".to_string(),
    };
    lines.push(header.bold().to_string());

    if let Some(error) = &snapshot.error {
        lines.push(format!("  {}", error.red()));
    } else {
        render_window(&mut lines, "5-hour", &snapshot.five_hour);
        render_window(&mut lines, "7-day", &snapshot.seven_day);
    }

    if let Some(cost) = cost {
        lines.push(format!(
            "  {}   {}",
            format!("{:<7}", "Today").cyan(),
            format_cost(cost.total)
        ));
    }

    lines.join("\n")
}

fn render_window(lines: &mut Vec<String>, label: &str, window: &QuotaWindow) {
    let percent_str = format_remaining_percent(window.utilization);
    let bar = format_usage_bar(window.utilization, BAR_WIDTH);

    lines.push(format!(
        "  {}   {} {}",
        format!("{:<7}", label).cyan(),
        color_by_remaining(window.utilization, &percent_str),
        bar.magenta()
    ));

    if !window.reset_in.is_empty() {
        lines.push(format!(
            "           {}",
            format!("Resets in {}", window.reset_in).dimmed()
        ));
    }
}

/// Green/yellow/red by how much of the window is left.
fn color_by_remaining(utilization: f64, text: &str) -> ColoredString {
    let remaining = 100.0 - utilization;
    if remaining >= 25.0 {
        text.green()
    } else if remaining >= 10.0 {
        text.yellow()
    } else {
        text.red()
    }
}
