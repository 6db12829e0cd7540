mod common;

use pretty_assertions::assert_eq;
use tracker_core::{update, AppState, Effect, ItemId, Msg, ParcelStatus};

use common::{init_logging, item, loaded, submit};

#[test]
fn noop_leaves_state_untouched() {
    let state = loaded(vec![item("a", "AA1", None, 1)]);
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_requests_a_redraw_only_when_rows_exist() {
    let (mut next, effects) = update(loaded(vec![item("a", "AA1", None, 1)]), Msg::Tick);
    assert!(effects.is_empty());
    assert!(next.consume_dirty());

    let (mut empty, _) = update(loaded(Vec::new()), Msg::Tick);
    assert!(!empty.consume_dirty());
}

#[test]
fn submit_adds_newest_first_with_unknown_status() {
    init_logging();
    let state = loaded(vec![item("old", "ZZ9", None, 1)]);

    let (mut next, effects) = submit(state, "  RR123456789IL ", " gift ", "new", 5_000);

    let items = next.items().to_vec();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId::new("new"));
    assert_eq!(items[0].code, "RR123456789IL");
    assert_eq!(items[0].label.as_deref(), Some("gift"));
    assert_eq!(items[0].status, ParcelStatus::Unknown);
    assert_eq!(items[0].status_text, None);
    assert_eq!(items[0].last_updated, 5_000);
    assert_eq!(items[1].id, ItemId::new("old"));

    assert_eq!(
        effects,
        vec![
            Effect::PersistItems(items),
            Effect::FetchSingle {
                item_id: ItemId::new("new"),
                code: "RR123456789IL".to_string(),
            },
        ]
    );

    let view = next.view();
    assert_eq!(view.code_input, "");
    assert_eq!(view.label_input, "");
    assert!(view.rows[0].refreshing);
    assert!(next.consume_dirty());
}

#[test]
fn blank_code_is_ignored() {
    let state = AppState::new();
    let (next, effects) = submit(state, "   ", "label", "x", 1);
    assert!(next.items().is_empty());
    assert!(effects.is_empty());
}

#[test]
fn blank_label_is_stored_as_absent() {
    let (next, _) = submit(AppState::new(), "AA1", "   ", "x", 1);
    assert_eq!(next.items()[0].label, None);
}

#[test]
fn reused_id_is_rejected() {
    let state = loaded(vec![item("dup", "AA1", None, 1)]);
    let (next, effects) = submit(state, "BB2", "", "dup", 2);
    assert_eq!(next.items().len(), 1);
    assert!(effects.is_empty());
}

#[test]
fn edit_changes_only_code_and_label() {
    let mut original = item("a", "AA1", Some("old label"), 1_000);
    original.apply_classification(
        tracker_core::classify(Some(&common::payload_with_text("AA1", "Delivered"))),
        2_000,
    );
    let state = loaded(vec![original.clone(), item("b", "BB2", None, 1)]);

    let (state, _) = update(state, Msg::EditStarted(ItemId::new("a")));
    let view = state.view();
    assert_eq!(view.editing_id, Some(ItemId::new("a")));
    assert_eq!(view.code_input, "AA1");
    assert_eq!(view.label_input, "old label");

    let (next, effects) = submit(state, " AA2 ", "new label", "ignored", 9_999);
    let edited = next.item(&ItemId::new("a")).unwrap().clone();

    assert_eq!(edited.id, original.id);
    assert_eq!(edited.code, "AA2");
    assert_eq!(edited.label.as_deref(), Some("new label"));
    assert_eq!(edited.status, original.status);
    assert_eq!(edited.status_text, original.status_text);
    assert_eq!(edited.last_updated, original.last_updated);
    assert_eq!(next.items().len(), 2);
    assert!(next.item(&ItemId::new("ignored")).is_none());
    assert_eq!(next.editing_id(), None);
    // Editing does not trigger a lookup.
    assert_eq!(effects, vec![Effect::PersistItems(next.items().to_vec())]);
}

#[test]
fn edit_cancel_clears_form_without_effects() {
    let state = loaded(vec![item("a", "AA1", None, 1)]);
    let (state, _) = update(state, Msg::EditStarted(ItemId::new("a")));
    let (next, effects) = update(state, Msg::EditCancelled);

    assert!(effects.is_empty());
    assert_eq!(next.editing_id(), None);
    assert_eq!(next.view().code_input, "");
    assert_eq!(next.items()[0].code, "AA1");
}

#[test]
fn edit_of_unknown_item_is_ignored() {
    let state = loaded(vec![item("a", "AA1", None, 1)]);
    let (next, effects) = update(state, Msg::EditStarted(ItemId::new("missing")));
    assert_eq!(next.editing_id(), None);
    assert!(effects.is_empty());
}

#[test]
fn delete_removes_exactly_one_item() {
    let items = vec![
        item("a", "AA1", None, 1),
        item("b", "AA1", None, 1),
        item("c", "CC3", None, 1),
    ];
    let state = loaded(items.clone());

    let (next, effects) = update(state, Msg::DeleteClicked(ItemId::new("a")));

    assert_eq!(next.items(), &items[1..]);
    assert_eq!(effects, vec![Effect::PersistItems(items[1..].to_vec())]);
}

#[test]
fn delete_of_unknown_id_does_nothing() {
    let state = loaded(vec![item("a", "AA1", None, 1)]);
    let (next, effects) = update(state.clone(), Msg::DeleteClicked(ItemId::new("zz")));
    assert_eq!(next.items(), state.items());
    assert!(effects.is_empty());
}

#[test]
fn deleting_the_item_being_edited_cancels_the_edit() {
    let state = loaded(vec![item("a", "AA1", None, 1), item("b", "BB2", None, 1)]);
    let (state, _) = update(state, Msg::EditStarted(ItemId::new("a")));
    let (state, _) = update(state, Msg::DeleteClicked(ItemId::new("a")));
    assert_eq!(state.editing_id(), None);

    // A later submit adds instead of editing a ghost.
    let (next, effects) = submit(state, "NEW1", "", "n", 3);
    assert_eq!(next.items().len(), 2);
    assert_eq!(next.items()[0].code, "NEW1");
    assert_eq!(effects.len(), 2);
}

#[test]
fn failed_write_keeps_the_edit_and_reports_it() {
    init_logging();
    let state = loaded(vec![item("a", "AA1", Some("before"), 1)]);
    let (state, _) = update(state, Msg::EditStarted(ItemId::new("a")));
    let (state, effects) = submit(state, "AA1", "after", "unused", 2);
    assert_eq!(effects.len(), 1);

    let (mut state, effects) = update(
        state,
        Msg::PersistFinished(Err("disk full".to_string())),
    );

    assert!(effects.is_empty());
    assert_eq!(state.items()[0].label.as_deref(), Some("after"));
    assert_eq!(state.view().persist_error.as_deref(), Some("disk full"));
    assert!(state.consume_dirty());

    let (state, _) = update(state, Msg::PersistFinished(Ok(())));
    assert_eq!(state.view().persist_error, None);
}

#[test]
fn summary_tracks_the_list() {
    let state = loaded(vec![item("a", "AA1", None, 1), item("b", "BB2", None, 1)]);
    let view = state.view();
    assert_eq!(view.summary.total, 2);
    assert_eq!(view.summary.in_transit, 2);
    assert_eq!(view.summary.delivered, 0);
}
