use std::collections::HashMap;

use crate::item::normalize_label;
use crate::reconcile::{apply_bulk, apply_single, distinct_codes};
use crate::{AppState, Effect, FetchFailure, ItemId, Msg, RawCarrierPayload, TrackedItem};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every change to the list is applied in memory first and then handed to
/// the shell as `Effect::PersistItems`; a failed write is reported back via
/// `Msg::PersistFinished` without rolling the change back.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ItemsLoaded(items) => {
            state.replace_items(items);
            Vec::new()
        }
        Msg::CodeInputChanged(text) => {
            state.form_mut().code_input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::LabelInputChanged(text) => {
            state.form_mut().label_input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FormSubmitted { new_id, now_ms } => submit_form(&mut state, new_id, now_ms),
        Msg::EditStarted(id) => {
            if let Some(item) = state.item(&id).cloned() {
                let form = state.form_mut();
                form.editing_id = Some(id);
                form.code_input = item.code;
                form.label_input = item.label.unwrap_or_default();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EditCancelled => {
            state.reset_form();
            Vec::new()
        }
        Msg::DeleteClicked(id) => {
            if state.item(&id).is_none() {
                return (state, Vec::new());
            }
            if state.editing_id() == Some(&id) {
                state.reset_form();
            }
            let next: Vec<TrackedItem> = state
                .items()
                .iter()
                .filter(|item| item.id != id)
                .cloned()
                .collect();
            state.replace_items(next.clone());
            vec![Effect::PersistItems(next)]
        }
        Msg::RefreshItemClicked(id) => match state.item(&id).map(|item| item.code.clone()) {
            Some(code) => {
                state.set_refresh_failed(id.clone(), false);
                state.set_refreshing(id.clone(), true);
                vec![Effect::FetchSingle { item_id: id, code }]
            }
            None => Vec::new(),
        },
        Msg::RefreshAllRequested => {
            let codes = distinct_codes(state.items());
            if codes.is_empty() {
                Vec::new()
            } else {
                state.set_refreshing_all(true);
                vec![Effect::FetchBulk { codes }]
            }
        }
        Msg::SingleFetched {
            item_id,
            code,
            result,
            now_ms,
        } => single_fetched(&mut state, item_id, &code, result, now_ms),
        Msg::BulkFetched {
            codes,
            result,
            now_ms,
        } => bulk_fetched(&mut state, &codes, result, now_ms),
        Msg::PersistFinished(result) => {
            state.set_persist_error(result.err());
            Vec::new()
        }
        Msg::Tick => {
            // Relative times in the rows go stale.
            if !state.items().is_empty() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_form(state: &mut AppState, new_id: ItemId, now_ms: u64) -> Vec<Effect> {
    let code = state.form().code_input.trim().to_owned();
    if code.is_empty() {
        return Vec::new();
    }
    let label = normalize_label(&state.form().label_input);

    if let Some(editing_id) = state.form().editing_id.clone() {
        let mut next = state.items().to_vec();
        let Some(item) = next.iter_mut().find(|item| item.id == editing_id) else {
            // The item was deleted while its edit was open.
            state.reset_form();
            return Vec::new();
        };
        item.edit(code, label);
        state.replace_items(next.clone());
        state.reset_form();
        return vec![Effect::PersistItems(next)];
    }

    if state.item(&new_id).is_some() {
        return Vec::new();
    }

    let mut next = Vec::with_capacity(state.items().len() + 1);
    next.push(TrackedItem::new(new_id.clone(), code.clone(), label, now_ms));
    next.extend(state.items().iter().cloned());
    state.replace_items(next.clone());
    state.reset_form();
    state.set_refreshing(new_id.clone(), true);

    vec![
        Effect::PersistItems(next),
        Effect::FetchSingle {
            item_id: new_id,
            code,
        },
    ]
}

fn single_fetched(
    state: &mut AppState,
    item_id: ItemId,
    code: &str,
    result: Result<RawCarrierPayload, FetchFailure>,
    now_ms: u64,
) -> Vec<Effect> {
    state.set_refreshing(item_id.clone(), false);
    let payload = match result {
        Ok(payload) => payload,
        Err(_) => {
            if state.item(&item_id).is_some() {
                state.set_refresh_failed(item_id, true);
            }
            return Vec::new();
        }
    };

    let matching = ids_with_codes(state, |item_code| item_code == code);
    if matching.is_empty() {
        return Vec::new();
    }
    for id in matching {
        state.set_refresh_failed(id, false);
    }
    let next = apply_single(state.items(), code, &payload, now_ms);
    state.replace_items(next.clone());
    vec![Effect::PersistItems(next)]
}

fn bulk_fetched(
    state: &mut AppState,
    codes: &[String],
    result: Result<HashMap<String, RawCarrierPayload>, FetchFailure>,
    now_ms: u64,
) -> Vec<Effect> {
    state.set_refreshing_all(false);
    let fetched = match result {
        Ok(fetched) => fetched,
        Err(_) => {
            let requested = ids_with_codes(state, |item_code| codes.iter().any(|c| c == item_code));
            for id in requested {
                state.set_refresh_failed(id, true);
            }
            return Vec::new();
        }
    };

    let matching = ids_with_codes(state, |item_code| fetched.contains_key(item_code));
    if matching.is_empty() {
        return Vec::new();
    }
    for id in matching {
        state.set_refresh_failed(id, false);
    }
    let next = apply_bulk(state.items(), &fetched, now_ms);
    state.replace_items(next.clone());
    vec![Effect::PersistItems(next)]
}

fn ids_with_codes(state: &AppState, mut matches: impl FnMut(&str) -> bool) -> Vec<ItemId> {
    state
        .items()
        .iter()
        .filter(|item| matches(&item.code))
        .map(|item| item.id.clone())
        .collect()
}
