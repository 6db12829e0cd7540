use crate::{ItemId, ListSummary, ParcelStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub rows: Vec<ItemRowView>,
    pub summary: ListSummary,
    pub code_input: String,
    pub label_input: String,
    pub editing_id: Option<ItemId>,
    pub refreshing_all: bool,
    /// Set when the last write of the list failed; cleared by the next success.
    pub persist_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub id: ItemId,
    pub code: String,
    pub label: Option<String>,
    pub status: ParcelStatus,
    pub status_text: Option<String>,
    pub last_updated: u64,
    pub refreshing: bool,
    pub refresh_failed: bool,
}

/// Coarse relative time, e.g. `5m ago`.
pub fn time_ago(now_ms: u64, timestamp_ms: u64) -> String {
    let minutes = now_ms.saturating_sub(timestamp_ms) / 60_000;
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::time_ago;

    #[test]
    fn time_ago_buckets() {
        let now = 10 * 24 * 3_600_000;
        assert_eq!(time_ago(now, now - 30_000), "just now");
        assert_eq!(time_ago(now, now - 5 * 60_000), "5m ago");
        assert_eq!(time_ago(now, now - 3 * 3_600_000), "3h ago");
        assert_eq!(time_ago(now, now - 2 * 24 * 3_600_000), "2d ago");
        // Clock skew never panics.
        assert_eq!(time_ago(now, now + 60_000), "just now");
    }
}
