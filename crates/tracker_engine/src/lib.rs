//! Parcel tracker engine: storage, the tracking service client and the
//! background poller.
mod badge;
mod client;
mod filename;
mod persist;
mod poller;
mod store;
mod types;

pub use badge::{recompute_badge, BadgeSurface, LogBadge};
pub use client::{ClientSettings, ReqwestTrackingClient, TrackingClient, DEFAULT_BACKEND_BASE};
pub use filename::key_filename;
pub use persist::{ensure_dir, read_optional, AtomicFileWriter, PersistError};
pub use poller::{Poller, DEFAULT_CHANGE_CHECK, DEFAULT_POLL_PERIOD};
pub use store::{
    select_backend, DirectoryBackend, ItemStore, KeyValueBackend, LocalDocumentBackend,
    StorageKey, StoreError, DEFAULT_STORAGE_KEY,
};
pub use types::{BackgroundMessage, BadgeTrigger, FailureKind, FetchError, StoreEvent};
