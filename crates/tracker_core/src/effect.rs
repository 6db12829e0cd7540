use crate::{ItemId, TrackedItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Overwrite the persisted list with this snapshot.
    PersistItems(Vec<TrackedItem>),
    /// Look up one code; the result comes back as `Msg::SingleFetched`.
    FetchSingle { item_id: ItemId, code: String },
    /// Look up several codes at once; the result comes back as `Msg::BulkFetched`.
    FetchBulk { codes: Vec<String> },
}
