mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_core::{
    apply_bulk, apply_single, distinct_codes, ParcelStatus, RawCarrierPayload, TrackedItem,
};

use common::{init_logging, item, payload_with_text};

fn sample_list() -> Vec<TrackedItem> {
    vec![
        item("c", "AA1", Some("shoes"), 1_000),
        item("b", "BB2", None, 1_000),
        item("a", "AA1", Some("same code"), 1_000),
    ]
}

#[test]
fn bulk_updates_every_item_sharing_a_code() {
    init_logging();
    let mut fetched = HashMap::new();
    fetched.insert("AA1".to_string(), payload_with_text("AA1", "Delivered"));

    let next = apply_bulk(&sample_list(), &fetched, 5_000);

    assert_eq!(next[0].status, ParcelStatus::Delivered);
    assert_eq!(next[2].status, ParcelStatus::Delivered);
    assert_eq!(next[0].status_text, next[2].status_text);
    assert_eq!(next[0].last_updated, 5_000);
    assert_eq!(next[2].last_updated, 5_000);
    // No fetched data for BB2: untouched.
    assert_eq!(next[1], sample_list()[1]);
}

#[test]
fn identity_order_and_user_fields_are_preserved() {
    let mut fetched = HashMap::new();
    fetched.insert("AA1".to_string(), payload_with_text("AA1", "In transit"));
    fetched.insert("BB2".to_string(), payload_with_text("BB2", "Out for delivery"));

    let before = sample_list();
    let next = apply_bulk(&before, &fetched, 2_000);

    let ids: Vec<_> = next.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
    for (old, new) in before.iter().zip(&next) {
        assert_eq!(old.code, new.code);
        assert_eq!(old.label, new.label);
    }
}

#[test]
fn reconciling_twice_converges() {
    let mut fetched = HashMap::new();
    fetched.insert("AA1".to_string(), payload_with_text("AA1", "נמסר ללקוח"));

    let once = apply_bulk(&sample_list(), &fetched, 3_000);
    let twice = apply_bulk(&once, &fetched, 3_000);
    assert_eq!(once, twice);

    // A stale clock never moves the timestamp backwards.
    let stale = apply_bulk(&once, &fetched, 2_000);
    assert!(stale.iter().all(|i| i.last_updated >= 1_000));
    assert_eq!(stale[0].last_updated, 3_000);
}

#[test]
fn error_payload_resets_status_to_unknown() {
    let mut list = sample_list();
    list[1].apply_classification(
        tracker_core::classify(Some(&payload_with_text("BB2", "Delivered"))),
        1_500,
    );
    let error = RawCarrierPayload::from_value(json!({ "error": "not found" }));

    let next = apply_single(&list, "BB2", &error, 4_000);

    assert_eq!(next[1].status, ParcelStatus::Unknown);
    assert_eq!(next[1].status_text, None);
    assert_eq!(next[1].last_updated, 4_000);
}

#[test]
fn single_payload_only_touches_its_code() {
    let next = apply_single(
        &sample_list(),
        "BB2",
        &payload_with_text("BB2", "Info received"),
        9_000,
    );
    assert_eq!(next[1].status, ParcelStatus::InfoReceived);
    assert_eq!(next[0], sample_list()[0]);
    assert_eq!(next[2], sample_list()[2]);
}

#[test]
fn distinct_codes_keep_first_occurrence_order() {
    assert_eq!(
        distinct_codes(&sample_list()),
        vec!["AA1".to_string(), "BB2".to_string()]
    );
    assert!(distinct_codes(&[]).is_empty());
}
