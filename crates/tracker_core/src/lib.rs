//! Parcel tracker core: data model, status classification, list
//! reconciliation and the pure state machine driving the shell.
mod badge;
mod classify;
mod effect;
mod item;
mod msg;
mod payload;
mod reconcile;
mod state;
mod update;
mod view_model;

pub use badge::{Badge, BadgeColor, ListSummary, BADGE_DEFAULT_TITLE};
pub use classify::{classify, Classification};
pub use effect::Effect;
pub use item::{normalize_label, ItemId, ParcelStatus, TrackedItem};
pub use msg::{FetchFailure, Msg};
pub use payload::{Checkpoint, CarrierResponse, ErrorResponse, RawCarrierPayload};
pub use reconcile::{apply_bulk, apply_single, distinct_codes};
pub use state::AppState;
pub use update::update;
pub use view_model::{time_ago, AppViewModel, ItemRowView};
