/// "{remaining}% remaining" where remaining = 100 - used, clamped and rounded.
pub fn format_remaining_percent(utilization: f64) -> String {
    let remaining = (100.0 - utilization).max(0.0).round() as u64;
    format!("{}% remaining", remaining)
}

/// "[████████░░░░]" where █ = remaining portion, ░ = used portion.
pub fn format_usage_bar(utilization: f64, width: usize) -> String {
    let utilization = utilization.clamp(0.0, 100.0);
    let used_blocks = ((utilization / 100.0) * width as f64).round() as usize;
    let remaining_blocks = width.saturating_sub(used_blocks);

    let filled: String = "█".repeat(remaining_blocks);
    let empty: String = "░".repeat(used_blocks);
    format!("[{}{}]", filled, empty)
}

/// "$12.34" with two decimals.
pub fn format_cost(total: f64) -> String {
    format!("${:.2}", total)
}
