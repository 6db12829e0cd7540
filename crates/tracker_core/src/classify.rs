use crate::{ParcelStatus, RawCarrierPayload};

/// Result of classifying one carrier payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: ParcelStatus,
    pub status_text: Option<String>,
}

impl Classification {
    pub const fn unknown() -> Self {
        Self {
            status: ParcelStatus::Unknown,
            status_text: None,
        }
    }
}

/// Ordered keyword rules, English and Hebrew. First match wins.
const RULES: &[(ParcelStatus, &[&str])] = &[
    (ParcelStatus::Delivered, &["delivered", "נמסר"]),
    (ParcelStatus::OutForDelivery, &["out for delivery", "למסירה"]),
    (
        ParcelStatus::InTransit,
        &["in transit", "בתהליך", "מיון", "נשלח"],
    ),
    (ParcelStatus::InfoReceived, &["info received", "מידע"]),
    (ParcelStatus::Exception, &["exception", "שגיאה", "חריגה"]),
];

/// Maps a carrier payload (possibly absent) to a status and display text.
///
/// Total: every input yields a valid status. Only a missing or blank
/// checkpoint text maps to `Unknown`; text that matches no rule counts as
/// movement and maps to `InTransit`.
pub fn classify(payload: Option<&RawCarrierPayload>) -> Classification {
    let Some(RawCarrierPayload::WellFormed(response)) = payload else {
        return Classification::unknown();
    };
    let Some(text) = response.latest_text() else {
        return Classification::unknown();
    };
    if text.trim().is_empty() {
        return Classification::unknown();
    }

    Classification {
        status: status_for_text(text),
        status_text: Some(text.to_owned()),
    }
}

fn status_for_text(text: &str) -> ParcelStatus {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map_or(ParcelStatus::InTransit, |(status, _)| *status)
}
