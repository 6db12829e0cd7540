use std::fmt::Write as _;

use tracker_core::{time_ago, AppViewModel, Badge, ItemRowView};
use tracker_engine::BadgeSurface;

pub fn render_list(view: &AppViewModel, now_ms: u64) -> String {
    let mut out = String::new();
    let summary = &view.summary;
    let _ = writeln!(
        out,
        "{} tracked, {} in transit, {} delivered{}",
        summary.total,
        summary.in_transit,
        summary.delivered,
        if view.refreshing_all { " (refreshing)" } else { "" }
    );

    if view.rows.is_empty() {
        out.push_str("No parcels tracked yet. Add one with: parcel-tracker add <code>\n");
    }
    for row in &view.rows {
        out.push_str(&render_row(row, now_ms));
        out.push('\n');
    }

    if let Some(err) = &view.persist_error {
        let _ = writeln!(out, "Warning: changes were not saved: {err}");
    }
    out
}

fn render_row(row: &ItemRowView, now_ms: u64) -> String {
    let mut line = format!("{:<36}  {}", row.id.as_str(), row.code);
    if let Some(label) = &row.label {
        let _ = write!(line, " ({label})");
    }
    let _ = write!(line, "  [{}]", row.status);
    if let Some(text) = &row.status_text {
        let _ = write!(line, " {text}");
    }
    let _ = write!(line, "  updated {}", time_ago(now_ms, row.last_updated));
    if row.refreshing {
        line.push_str("  refreshing");
    }
    if row.refresh_failed {
        line.push_str("  refresh failed");
    }
    line
}

pub fn badge_line(badge: &Badge) -> String {
    match badge.color {
        Some(color) => format!("Badge: {} {} ({})", badge.text, color.hex(), badge.title),
        None => format!("Badge: cleared ({})", badge.title),
    }
}

/// Prints each badge change on stdout.
pub struct ConsoleBadge;

impl BadgeSurface for ConsoleBadge {
    fn set_badge(&self, badge: &Badge) {
        println!("{}", badge_line(badge));
    }
}
