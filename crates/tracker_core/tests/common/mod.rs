#![allow(dead_code)]

use serde_json::json;
use tracker_core::{update, AppState, Effect, ItemId, Msg, RawCarrierPayload, TrackedItem};

pub fn init_logging() {
    tracker_logging::initialize_for_tests();
}

/// A well-formed carrier payload whose newest checkpoint reads `text`.
pub fn payload_with_text(code: &str, text: &str) -> RawCarrierPayload {
    RawCarrierPayload::from_value(json!({
        "itemcode": code,
        "itemcodehistory": [
            { "stateDescription": text, "date": "2024-05-02" },
            { "stateDescription": "older entry", "date": "2024-05-01" }
        ]
    }))
}

pub fn item(id: &str, code: &str, label: Option<&str>, last_updated: u64) -> TrackedItem {
    TrackedItem::new(
        ItemId::new(id),
        code,
        label.map(ToOwned::to_owned),
        last_updated,
    )
}

pub fn loaded(items: Vec<TrackedItem>) -> AppState {
    let (mut state, _) = update(AppState::new(), Msg::ItemsLoaded(items));
    state.consume_dirty();
    state
}

pub fn submit(state: AppState, code: &str, label: &str, new_id: &str, now_ms: u64) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::CodeInputChanged(code.to_string()));
    let (state, _) = update(state, Msg::LabelInputChanged(label.to_string()));
    update(
        state,
        Msg::FormSubmitted {
            new_id: ItemId::new(new_id),
            now_ms,
        },
    )
}
