use std::sync::Mutex;

use tracker_core::Badge;
use tracker_logging::{tracker_info, tracker_warn};

use crate::{BadgeTrigger, ItemStore};

/// Where the badge is shown.
pub trait BadgeSurface: Send + Sync {
    fn set_badge(&self, badge: &Badge);
}

/// Logs every badge change and remembers the latest one.
#[derive(Debug, Default)]
pub struct LogBadge {
    last: Mutex<Option<Badge>>,
}

impl LogBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Badge> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl BadgeSurface for LogBadge {
    fn set_badge(&self, badge: &Badge) {
        if badge.is_cleared() {
            tracker_info!("Badge cleared ({})", badge.title);
        } else {
            tracker_info!(
                "Badge '{}' color={} title='{}'",
                badge.text,
                badge.color.map_or("none", |color| color.hex()),
                badge.title
            );
        }
        if let Ok(mut last) = self.last.lock() {
            *last = Some(badge.clone());
        }
    }
}

/// Recomputes the badge from persisted items only; never touches the
/// network. A failing store clears the badge instead of showing stale counts.
pub fn recompute_badge(
    store: &ItemStore,
    surface: &dyn BadgeSurface,
    trigger: BadgeTrigger,
) -> Badge {
    let badge = match store.try_read_all() {
        Ok(items) => Badge::from_items(&items),
        Err(err) => {
            tracker_warn!("Badge update ({:?}) could not read items: {}", trigger, err);
            Badge::cleared()
        }
    };
    surface.set_badge(&badge);
    badge
}
