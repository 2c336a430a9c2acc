// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Queued change notifications.
//!
//! Mutations never call back into observers. Each notable change is appended
//! to a pending [`FormChanges`] inside the store, and a view drains it with
//! [`ElementStore::take_changes`] once the mutation has returned. Observers
//! therefore always see the post-mutation state.
//!
//! Entries are not deduplicated. An element that flips visible and back
//! appears twice in [`FormChanges::visibility`].

use alloc::vec::Vec;

use super::id::ElementId;
use super::store::ElementStore;
use crate::survey::Survey;

/// Notifications accumulated since the last [`ElementStore::take_changes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormChanges {
    /// Elements whose own visibility flag changed.
    pub visibility: Vec<ElementId>,
    /// Rows whose visibility flipped, as `(container, row index)`.
    pub row_visibility: Vec<(ElementId, usize)>,
    /// Containers whose row layout was dropped and must be re-read.
    pub rows_changed: Vec<ElementId>,
    /// Elements whose rendered width, right indent, or inner indent changed.
    pub layout: Vec<ElementId>,
}

impl FormChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.visibility.clear();
        self.row_visibility.clear();
        self.rows_changed.clear();
        self.layout.clear();
    }

    /// Returns whether no change is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty()
            && self.row_visibility.is_empty()
            && self.rows_changed.is_empty()
            && self.layout.is_empty()
    }
}

impl<S: Survey> ElementStore<S> {
    /// Drains the pending notifications.
    pub fn take_changes(&mut self) -> FormChanges {
        let mut changes = FormChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a caller-provided
    /// buffer.
    pub fn take_changes_into(&mut self, changes: &mut FormChanges) {
        changes.clear();
        core::mem::swap(changes, &mut self.pending);
    }

    /// Returns the notifications queued so far without draining them.
    #[must_use]
    pub fn pending_changes(&self) -> &FormChanges {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_changes_into_reuses_buffer() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let q = store.add_new_question(page, "q");

        let mut changes = FormChanges::default();
        store.take_changes_into(&mut changes);
        assert!(
            changes.rows_changed.contains(&page),
            "structural change should be reported"
        );

        store.set_visible(q, false);
        store.take_changes_into(&mut changes);
        assert!(changes.rows_changed.is_empty(), "rows_changed should be cleared");
        assert_eq!(changes.visibility, [q], "only the new change is present");
        assert!(store.pending_changes().is_empty(), "pending queue was drained");
    }
}
