use std::collections::BTreeSet;

use crate::view_model::{AppViewModel, ItemRowView};
use crate::{ItemId, ListSummary, TrackedItem};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct FormState {
    pub(crate) code_input: String,
    pub(crate) label_input: String,
    pub(crate) editing_id: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Newest first.
    items: Vec<TrackedItem>,
    form: FormState,
    refreshing: BTreeSet<ItemId>,
    refresh_failed: BTreeSet<ItemId>,
    refreshing_all: bool,
    persist_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&TrackedItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn editing_id(&self) -> Option<&ItemId> {
        self.form.editing_id.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .items
            .iter()
            .map(|item| ItemRowView {
                id: item.id.clone(),
                code: item.code.clone(),
                label: item.label.clone(),
                status: item.status,
                status_text: item.status_text.clone(),
                last_updated: item.last_updated,
                refreshing: self.refreshing_all || self.refreshing.contains(&item.id),
                refresh_failed: self.refresh_failed.contains(&item.id),
            })
            .collect();

        AppViewModel {
            rows,
            summary: ListSummary::from_items(&self.items),
            code_input: self.form.code_input.clone(),
            label_input: self.form.label_input.clone(),
            editing_id: self.form.editing_id.clone(),
            refreshing_all: self.refreshing_all,
            persist_error: self.persist_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn replace_items(&mut self, items: Vec<TrackedItem>) {
        self.items = items;
        let known: BTreeSet<ItemId> = self.items.iter().map(|item| item.id.clone()).collect();
        self.refreshing.retain(|id| known.contains(id));
        self.refresh_failed.retain(|id| known.contains(id));
        self.mark_dirty();
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub(crate) fn form(&self) -> &FormState {
        &self.form
    }

    pub(crate) fn reset_form(&mut self) {
        self.form = FormState::default();
        self.mark_dirty();
    }

    pub(crate) fn set_refreshing(&mut self, id: ItemId, refreshing: bool) {
        if refreshing {
            self.refreshing.insert(id);
        } else {
            self.refreshing.remove(&id);
        }
        self.mark_dirty();
    }

    pub(crate) fn set_refresh_failed(&mut self, id: ItemId, failed: bool) {
        if failed {
            self.refresh_failed.insert(id);
        } else {
            self.refresh_failed.remove(&id);
        }
        self.mark_dirty();
    }

    pub(crate) fn set_refreshing_all(&mut self, refreshing: bool) {
        self.refreshing_all = refreshing;
        self.mark_dirty();
    }

    pub(crate) fn set_persist_error(&mut self, error: Option<String>) {
        if self.persist_error != error {
            self.persist_error = error;
            self.mark_dirty();
        }
    }
}
