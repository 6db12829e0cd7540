//! Persisted item store.
//!
//! The whole tracked list lives under one key as a single JSON array, so
//! every write is a full overwrite and concurrent writers are
//! last-write-wins. The backend is picked once at startup by
//! [`select_backend`]; nothing above this module knows which one is active.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;
use tracker_core::TrackedItem;
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::filename::key_filename;
use crate::persist::{ensure_dir, read_optional, AtomicFileWriter, PersistError};
use crate::StoreEvent;

pub const DEFAULT_STORAGE_KEY: &str = "parcel-tracker:items";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("stored data could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// The single key the tracked list is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.chars().any(char::is_control) {
            return Err(StoreError::InvalidKey(
                "key cannot contain control characters".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self(DEFAULT_STORAGE_KEY.to_string())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// String-valued key-value storage.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Platform store: one file per key inside a per-user data directory.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    writer: AtomicFileWriter,
}

impl DirectoryBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.writer.dir().join(key_filename(key))
    }
}

impl KeyValueBackend for DirectoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(read_optional(&self.path_for(key))?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writer.write(&key_filename(key), value)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("platform directory {}", self.writer.dir().display())
    }
}

/// Local fallback: a single JSON document mapping keys to string values.
#[derive(Debug, Clone)]
pub struct LocalDocumentBackend {
    path: PathBuf,
}

impl LocalDocumentBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match read_optional(&self.path)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl KeyValueBackend for LocalDocumentBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut document = self.load().unwrap_or_else(|err| {
            tracker_warn!(
                "Discarding unreadable local store {:?}: {}",
                self.path,
                err
            );
            BTreeMap::new()
        });
        document.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&document)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::InvalidKey(format!("bad local store path {:?}", self.path)))?;
        AtomicFileWriter::new(dir).write(filename, &content)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local document {}", self.path.display())
    }
}

/// Picks the platform directory when it exists (or can be created) and is
/// writable, otherwise the local document.
pub fn select_backend(platform_dir: Option<&Path>, local_path: &Path) -> Box<dyn KeyValueBackend> {
    if let Some(dir) = platform_dir {
        match ensure_dir(dir) {
            Ok(()) => {
                tracker_info!("Using platform storage at {:?}", dir);
                return Box::new(DirectoryBackend::new(dir.to_path_buf()));
            }
            Err(err) => {
                tracker_warn!("Platform storage at {:?} unavailable: {}", dir, err);
            }
        }
    }
    tracker_info!("Using local storage document {:?}", local_path);
    Box::new(LocalDocumentBackend::new(local_path.to_path_buf()))
}

pub struct ItemStore {
    backend: Box<dyn KeyValueBackend>,
    key: StorageKey,
    events: broadcast::Sender<StoreEvent>,
    /// Raw blob this store last wrote or loaded; `None` until the first
    /// write, load or check.
    last_seen: Mutex<Option<Option<String>>>,
}

impl ItemStore {
    pub fn new(backend: Box<dyn KeyValueBackend>, key: StorageKey) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            backend,
            key,
            events,
            last_seen: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn describe(&self) -> String {
        format!("{} (key {})", self.backend.describe(), self.key)
    }

    /// Reads the list; absent, unreadable or unparsable content yields an
    /// empty list.
    pub fn read_all(&self) -> Vec<TrackedItem> {
        self.or_empty(self.try_read_all())
    }

    pub fn try_read_all(&self) -> Result<Vec<TrackedItem>, StoreError> {
        decode(self.backend.get(self.key.as_str())?)
    }

    /// Like [`ItemStore::read_all`], and also records what was read as the
    /// baseline for [`ItemStore::check_external`]. Use it when the caller is
    /// going to write the list back.
    pub fn load_tracked(&self) -> Vec<TrackedItem> {
        let raw = match self.backend.get(self.key.as_str()) {
            Ok(raw) => raw,
            Err(err) => return self.or_empty(Err(err)),
        };
        self.remember(raw.clone());
        self.or_empty(decode(raw))
    }

    /// Whether anything has ever been written under the key.
    pub fn has_data(&self) -> Result<bool, StoreError> {
        Ok(self.backend.get(self.key.as_str())?.is_some())
    }

    /// Overwrites the whole list and notifies subscribers on success.
    pub fn write_all(&self, items: &[TrackedItem]) -> Result<(), StoreError> {
        let content = serde_json::to_string(items)?;
        self.backend.set(self.key.as_str(), &content)?;
        tracker_debug!("Wrote {} tracked items to {}", items.len(), self.describe());
        self.remember(Some(content));
        // No subscribers is fine.
        let _ = self.events.send(StoreEvent::Changed);
        Ok(())
    }

    /// Compares the persisted blob with the one this store last saw. On a
    /// difference (another process wrote, or nothing was seen yet) records
    /// the new blob, sends [`StoreEvent::ExternalChange`] and returns `true`.
    pub fn check_external(&self) -> Result<bool, StoreError> {
        let current = self.backend.get(self.key.as_str())?;
        {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            if last_seen.as_ref() == Some(&current) {
                return Ok(false);
            }
            *last_seen = Some(current);
        }
        tracker_info!("Persisted items changed outside {}", self.describe());
        let _ = self.events.send(StoreEvent::ExternalChange);
        Ok(true)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn remember(&self, raw: Option<String>) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
    }

    fn or_empty(&self, result: Result<Vec<TrackedItem>, StoreError>) -> Vec<TrackedItem> {
        result.unwrap_or_else(|err| {
            tracker_warn!("Failed to read tracked items from {}: {}", self.describe(), err);
            Vec::new()
        })
    }
}

fn decode(raw: Option<String>) -> Result<Vec<TrackedItem>, StoreError> {
    match raw {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(Vec::new()),
    }
}
