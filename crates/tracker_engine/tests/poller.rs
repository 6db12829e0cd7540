use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{sleep, timeout};
use tracker_core::{Badge, BadgeColor, ItemId, ParcelStatus, TrackedItem};
use tracker_engine::{
    recompute_badge, BackgroundMessage, BadgeSurface, BadgeTrigger, DirectoryBackend, ItemStore,
    KeyValueBackend, LogBadge, Poller, StorageKey, StoreError,
};

fn store_in(temp: &TempDir) -> Arc<ItemStore> {
    Arc::new(ItemStore::new(
        Box::new(DirectoryBackend::new(temp.path().to_path_buf())),
        StorageKey::default(),
    ))
}

async fn wait_for_badge(badge: &LogBadge, want: impl Fn(&Badge) -> bool) -> Badge {
    for _ in 0..100 {
        if let Some(last) = badge.last() {
            if want(&last) {
                return last;
            }
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("badge never reached the expected state: {:?}", badge.last());
}

#[tokio::test]
async fn fresh_install_clears_the_badge_and_ticks_broadcast_refresh() {
    tracker_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let badge = Arc::new(LogBadge::new());
    let poller = Poller::new(store_in(&temp), badge.clone(), Duration::from_millis(50));
    let mut signals = poller.subscribe();
    let handle = poller.spawn();

    let signal = timeout(Duration::from_secs(2), signals.recv())
        .await
        .expect("tick within deadline")
        .expect("channel open");
    assert_eq!(signal, BackgroundMessage::RefreshAll);
    assert!(badge.last().expect("badge set").is_cleared());

    handle.abort();
}

#[tokio::test]
async fn store_writes_update_the_badge() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    let badge = Arc::new(LogBadge::new());
    let handle = Poller::new(store.clone(), badge.clone(), Duration::from_secs(3600)).spawn();

    wait_for_badge(&badge, Badge::is_cleared).await;

    let mut delivered = TrackedItem::new(ItemId::new("b"), "BB2", None, 0);
    delivered.status = ParcelStatus::Delivered;
    store
        .write_all(&[TrackedItem::new(ItemId::new("a"), "AA1", None, 0), delivered])
        .unwrap();

    let shown = wait_for_badge(&badge, |b| !b.is_cleared()).await;
    assert_eq!(shown.text, "1 / 1");
    assert_eq!(shown.color, Some(BadgeColor::Outstanding));
    assert_eq!(shown.title, "Parcel Tracker: 1 in transit, 1 delivered");

    store.write_all(&[]).unwrap();
    wait_for_badge(&badge, Badge::is_cleared).await;

    handle.abort();
}

#[tokio::test]
async fn writes_by_another_process_update_the_badge() {
    let temp = TempDir::new().unwrap();
    let badge = Arc::new(LogBadge::new());
    let handle = Poller::new(store_in(&temp), badge.clone(), Duration::from_secs(3600))
        .with_change_check(Duration::from_millis(20))
        .spawn();
    wait_for_badge(&badge, Badge::is_cleared).await;

    // A second store on the same directory stands in for another process.
    store_in(&temp)
        .write_all(&[TrackedItem::new(ItemId::new("y"), "YY1", None, 0)])
        .unwrap();

    let shown = wait_for_badge(&badge, |b| !b.is_cleared()).await;
    assert_eq!(shown.text, "1 / 0");

    handle.abort();
}

struct BrokenBackend;

impl KeyValueBackend for BrokenBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(Some("{ not json".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[test]
fn unreadable_store_clears_the_badge() {
    let store = ItemStore::new(Box::new(BrokenBackend), StorageKey::default());
    let badge = LogBadge::new();
    badge.set_badge(&Badge::from_items(&[TrackedItem::new(ItemId::new("a"), "AA1", None, 0)]));

    let shown = recompute_badge(&store, &badge, BadgeTrigger::Startup);
    assert!(shown.is_cleared());
    assert_eq!(badge.last(), Some(Badge::cleared()));
}
