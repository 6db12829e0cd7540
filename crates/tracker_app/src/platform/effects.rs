use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracker_core::{Effect, FetchFailure, Msg};
use tracker_engine::{ItemStore, TrackingClient};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Runs core effects; each effect yields exactly one `Msg`. Lookups run as
/// tasks, store writes happen immediately.
pub struct EffectRunner {
    store: Arc<ItemStore>,
    client: Arc<dyn TrackingClient>,
    tasks: JoinSet<Msg>,
}

impl EffectRunner {
    pub fn new(store: Arc<ItemStore>, client: Arc<dyn TrackingClient>) -> Self {
        Self {
            store,
            client,
            tasks: JoinSet::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistItems(items) => {
                    // Written inline so snapshots land in the order they were produced.
                    tracker_debug!("PersistItems count={}", items.len());
                    let result = self.store.write_all(&items).map_err(|err| {
                        tracker_warn!("Persisting items failed: {}", err);
                        err.to_string()
                    });
                    self.tasks.spawn(async move { Msg::PersistFinished(result) });
                }
                Effect::FetchSingle { item_id, code } => {
                    tracker_info!("FetchSingle id={} code={}", item_id, code);
                    let client = self.client.clone();
                    self.tasks.spawn(async move {
                        let result = client.fetch_single(&code).await.map_err(|err| {
                            tracker_warn!("Lookup of {} failed: {}", code, err);
                            FetchFailure::new(err.to_string())
                        });
                        Msg::SingleFetched {
                            item_id,
                            code,
                            result,
                            now_ms: now_ms(),
                        }
                    });
                }
                Effect::FetchBulk { codes } => {
                    tracker_info!("FetchBulk codes={}", codes.len());
                    let client = self.client.clone();
                    self.tasks.spawn(async move {
                        let result = client.fetch_bulk(&codes).await.map_err(|err| {
                            tracker_warn!("Bulk lookup of {} code(s) failed: {}", codes.len(), err);
                            FetchFailure::new(err.to_string())
                        });
                        Msg::BulkFetched {
                            codes,
                            result,
                            now_ms: now_ms(),
                        }
                    });
                }
            }
        }
    }

    /// Next finished effect; `None` once nothing is in flight.
    pub async fn next_msg(&mut self) -> Option<Msg> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(msg) => return Some(msg),
                Err(err) => tracker_warn!("Effect task ended abnormally: {}", err),
            }
        }
        None
    }
}
