mod common;

use tracker_core::{
    classify, Badge, BadgeColor, ListSummary, ParcelStatus, TrackedItem, BADGE_DEFAULT_TITLE,
};

use common::{item, payload_with_text};

fn with_status(mut tracked: TrackedItem, text: &str) -> TrackedItem {
    tracked.apply_classification(classify(Some(&payload_with_text(&tracked.code, text))), 10);
    tracked
}

#[test]
fn empty_list_clears_the_badge() {
    let badge = Badge::from_items(&[]);
    assert!(badge.is_cleared());
    assert_eq!(badge.color, None);
    assert_eq!(badge.title, BADGE_DEFAULT_TITLE);
    assert_eq!(badge, Badge::cleared());
}

#[test]
fn outstanding_items_use_the_outstanding_color() {
    let items = vec![
        with_status(item("a", "AA1", None, 0), "Delivered"),
        item("b", "BB2", None, 0),
        with_status(item("c", "CC3", None, 0), "Out for delivery"),
        with_status(item("d", "DD4", None, 0), "exception"),
    ];
    let badge = Badge::from_items(&items);
    assert_eq!(badge.text, "3 / 1");
    assert_eq!(badge.color, Some(BadgeColor::Outstanding));
    assert_eq!(badge.title, "Parcel Tracker: 3 in transit, 1 delivered");
}

#[test]
fn all_delivered_uses_the_done_color() {
    let items = vec![
        with_status(item("a", "AA1", None, 0), "Delivered"),
        with_status(item("b", "BB2", None, 0), "נמסר"),
    ];
    let badge = Badge::from_items(&items);
    assert_eq!(badge.text, "0 / 2");
    assert_eq!(badge.color, Some(BadgeColor::Done));
    assert_ne!(BadgeColor::Done.hex(), BadgeColor::Outstanding.hex());
}

#[test]
fn summary_counts_everything_not_delivered_as_in_transit() {
    let items = vec![
        item("a", "AA1", None, 0),
        with_status(item("b", "BB2", None, 0), "Delivered"),
    ];
    assert_eq!(items[0].status, ParcelStatus::Unknown);
    assert_eq!(
        ListSummary::from_items(&items),
        ListSummary {
            total: 2,
            in_transit: 1,
            delivered: 1
        }
    );
}
