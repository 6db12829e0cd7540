use crate::TrackedItem;

pub const BADGE_DEFAULT_TITLE: &str = "Parcel Tracker";

/// Counts derived from the tracked list. "In transit" means anything not
/// yet delivered, whatever its exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListSummary {
    pub total: usize,
    pub in_transit: usize,
    pub delivered: usize,
}

impl ListSummary {
    pub fn from_items(items: &[TrackedItem]) -> Self {
        let delivered = items.iter().filter(|item| item.status.is_delivered()).count();
        Self {
            total: items.len(),
            in_transit: items.len() - delivered,
            delivered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    /// Something is still on its way.
    Outstanding,
    /// Everything has been delivered.
    Done,
}

impl BadgeColor {
    pub const fn hex(self) -> &'static str {
        match self {
            BadgeColor::Outstanding => "#F59E0B",
            BadgeColor::Done => "#16A34A",
        }
    }
}

/// What the icon badge shows. A cleared badge has no text and no color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<BadgeColor>,
    pub title: String,
}

impl Badge {
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            color: None,
            title: BADGE_DEFAULT_TITLE.to_string(),
        }
    }

    pub fn from_items(items: &[TrackedItem]) -> Self {
        Self::from_summary(ListSummary::from_items(items))
    }

    pub fn from_summary(summary: ListSummary) -> Self {
        if summary.total == 0 {
            return Self::cleared();
        }
        let color = if summary.in_transit > 0 {
            BadgeColor::Outstanding
        } else {
            BadgeColor::Done
        };
        Self {
            text: format!("{} / {}", summary.in_transit, summary.delivered),
            color: Some(color),
            title: format!(
                "{BADGE_DEFAULT_TITLE}: {} in transit, {} delivered",
                summary.in_transit, summary.delivered
            ),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.text.is_empty()
    }
}
