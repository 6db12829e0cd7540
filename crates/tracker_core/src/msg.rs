use std::collections::HashMap;

use crate::{ItemId, RawCarrierPayload, TrackedItem};

/// Why a lookup did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Replace the in-memory list with what the store returned.
    ItemsLoaded(Vec<TrackedItem>),
    /// User edited the code field.
    CodeInputChanged(String),
    /// User edited the label field.
    LabelInputChanged(String),
    /// User submitted the form. `new_id` is only used when not editing.
    FormSubmitted { new_id: ItemId, now_ms: u64 },
    /// User chose an item to edit; the form is filled from it.
    EditStarted(ItemId),
    EditCancelled,
    DeleteClicked(ItemId),
    RefreshItemClicked(ItemId),
    /// Manual "refresh all" or the periodic background signal.
    RefreshAllRequested,
    SingleFetched {
        item_id: ItemId,
        code: String,
        result: Result<RawCarrierPayload, FetchFailure>,
        now_ms: u64,
    },
    BulkFetched {
        codes: Vec<String>,
        result: Result<HashMap<String, RawCarrierPayload>, FetchFailure>,
        now_ms: u64,
    },
    /// Outcome of a `PersistItems` effect.
    PersistFinished(Result<(), String>),
    /// Periodic redraw request; no effects.
    Tick,
    NoOp,
}
