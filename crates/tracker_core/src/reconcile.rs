//! Merging fetched carrier payloads into the tracked list.
//!
//! Items are matched by `code`, so every item sharing a code receives the
//! same snapshot. Identity, order and user-entered fields are preserved.

use std::collections::{HashMap, HashSet};

use crate::{classify, RawCarrierPayload, TrackedItem};

/// Applies a bulk response (`code -> payload`). Items whose code is not a
/// key are returned unchanged.
pub fn apply_bulk(
    items: &[TrackedItem],
    fetched: &HashMap<String, RawCarrierPayload>,
    now_ms: u64,
) -> Vec<TrackedItem> {
    items
        .iter()
        .map(|item| match fetched.get(&item.code) {
            Some(payload) => refreshed(item, payload, now_ms),
            None => item.clone(),
        })
        .collect()
}

/// Applies one code's payload to every item carrying that code.
pub fn apply_single(
    items: &[TrackedItem],
    code: &str,
    payload: &RawCarrierPayload,
    now_ms: u64,
) -> Vec<TrackedItem> {
    items
        .iter()
        .map(|item| {
            if item.code == code {
                refreshed(item, payload, now_ms)
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Codes to request in a bulk lookup: first occurrence order, no repeats.
pub fn distinct_codes(items: &[TrackedItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for item in items {
        if seen.insert(item.code.as_str()) {
            codes.push(item.code.clone());
        }
    }
    codes
}

fn refreshed(item: &TrackedItem, payload: &RawCarrierPayload, now_ms: u64) -> TrackedItem {
    let mut next = item.clone();
    next.apply_classification(classify(Some(payload)), now_ms);
    next
}
