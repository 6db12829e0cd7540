use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::Classification;

/// Opaque, immutable identity of a tracked item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of delivery states shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParcelStatus {
    #[default]
    Unknown,
    #[serde(rename = "Info Received")]
    InfoReceived,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Exception,
}

impl ParcelStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ParcelStatus::Unknown => "Unknown",
            ParcelStatus::InfoReceived => "Info Received",
            ParcelStatus::InTransit => "In Transit",
            ParcelStatus::OutForDelivery => "Out for Delivery",
            ParcelStatus::Delivered => "Delivered",
            ParcelStatus::Exception => "Exception",
        }
    }

    pub const fn is_delivered(self) -> bool {
        matches!(self, ParcelStatus::Delivered)
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parcel in the persisted list.
///
/// `status`, `status_text` and `last_updated` form a single snapshot and are
/// only written through [`TrackedItem::apply_classification`]; `code` and
/// `label` only through [`TrackedItem::edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub id: ItemId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub status: ParcelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub last_updated: u64,
}

impl TrackedItem {
    pub fn new(id: ItemId, code: impl Into<String>, label: Option<String>, now_ms: u64) -> Self {
        Self {
            id,
            code: code.into(),
            label,
            status: ParcelStatus::Unknown,
            status_text: None,
            last_updated: now_ms,
        }
    }

    /// Replaces the status snapshot. The timestamp never moves backwards.
    pub fn apply_classification(&mut self, classification: Classification, now_ms: u64) {
        self.status = classification.status;
        self.status_text = classification.status_text;
        self.last_updated = self.last_updated.max(now_ms);
    }

    pub fn edit(&mut self, code: impl Into<String>, label: Option<String>) {
        self.code = code.into();
        self.label = label;
    }
}

/// Trims a user-entered label; blank input means "no label".
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_display_string() {
        let json = serde_json::to_string(&ParcelStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for Delivery\"");
        let back: ParcelStatus = serde_json::from_str("\"Info Received\"").unwrap();
        assert_eq!(back, ParcelStatus::InfoReceived);
    }

    #[test]
    fn item_uses_camel_case_keys_and_skips_absent_fields() {
        let item = TrackedItem::new(ItemId::new("a1"), "RR1", None, 42);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "a1",
                "code": "RR1",
                "status": "Unknown",
                "lastUpdated": 42
            })
        );
    }

    #[test]
    fn blank_label_is_absent() {
        assert_eq!(normalize_label("   "), None);
        assert_eq!(normalize_label(" gift "), Some("gift".to_string()));
    }
}
