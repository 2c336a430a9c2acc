// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row layout.
//!
//! A container groups its direct children into rows: a new row starts at the
//! first child and at every child whose `start_with_new_line` flag is set.
//! Each row is visible when at least one member is effectively visible, and
//! its `k` visible members share the width evenly (`floor(100 / k)%` unless a
//! member has an explicit width). Every visible member but the last gets a
//! right indent of 1.
//!
//! Rows are built lazily and cached. Visibility changes never rebuild them;
//! they re-lay-out the single row holding the changed element.

use alloc::format;
use alloc::vec::Vec;

use tracing::trace;

use super::id::ElementId;
use super::store::ElementStore;
use crate::survey::Survey;

/// A horizontal group of sibling elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub(crate) container: ElementId,
    pub(crate) elements: Vec<ElementId>,
    pub(crate) visible: bool,
}

impl Row {
    fn new(container: ElementId, visible: bool) -> Self {
        Self {
            container,
            elements: Vec::new(),
            visible,
        }
    }

    /// The container this row belongs to.
    #[must_use]
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// The members of the row, in element order.
    #[must_use]
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Whether any member is effectively visible.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }
}

impl<S: Survey> ElementStore<S> {
    /// Returns the row layout of a container, building it if needed.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn rows(&mut self, container: ElementId) -> &[Row] {
        self.validate(container);
        let c = container.idx;
        if self.panel(c).rows.is_none() {
            let rows = self.build_rows(c);
            let panel = self.panel_mut(c);
            panel.rows = Some(rows);
            panel.stats.row_rebuilds += 1;
        }
        self.panel(c).rows.as_deref().unwrap_or(&[])
    }

    fn build_rows(&mut self, c: u32) -> Vec<Row> {
        let container = self.handle(c);
        // Rows start out visible only in design mode, before layout.
        let initial = self.is_design_mode_at(c);
        let mut rows: Vec<Row> = Vec::new();
        for (i, &child) in self.panel(c).children.iter().enumerate() {
            if i == 0 || self.start_with_new_line[child as usize] {
                rows.push(Row::new(container, initial));
            }
            if let Some(row) = rows.last_mut() {
                row.elements.push(self.handle(child));
            }
        }
        for row in &mut rows {
            self.layout_row(row);
        }
        trace!(container = c, rows = rows.len(), "rebuilt rows");
        rows
    }

    /// Recomputes a row's visibility and its members' widths and indents.
    ///
    /// Returns whether the row's visibility flipped. Members whose layout
    /// changed are queued as layout changes.
    fn layout_row(&mut self, row: &mut Row) -> bool {
        let visible_count = row
            .elements
            .iter()
            .filter(|e| self.is_visible_at(e.idx))
            .count();
        let was_visible = row.visible;
        row.visible = visible_count > 0;
        if visible_count == 0 {
            return was_visible;
        }

        let mut position = 0;
        for &element in &row.elements {
            if !self.is_visible_at(element.idx) {
                continue;
            }
            let i = element.idx as usize;
            let width = self.width[i]
                .clone()
                .unwrap_or_else(|| format!("{}%", 100 / visible_count));
            let indent = u32::from(position < visible_count - 1);
            if self.render_width[i] != width || self.right_indent[i] != indent {
                self.render_width[i] = width;
                self.right_indent[i] = indent;
                self.pending.layout.push(element);
            }
            position += 1;
        }
        was_visible != row.visible
    }

    /// Re-lays-out the cached row of container `c` holding element `e`.
    ///
    /// Does nothing if `c` has no cached rows.
    pub(crate) fn update_row_containing(&mut self, c: u32, e: u32) {
        let Some(mut rows) = self.panel_mut(c).rows.take() else {
            return;
        };
        if let Some(pos) = rows
            .iter()
            .position(|row| row.elements.iter().any(|x| x.idx == e))
            && self.layout_row(&mut rows[pos])
        {
            let container = self.handle(c);
            self.pending.row_visibility.push((container, pos));
        }
        self.panel_mut(c).rows = Some(rows);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[derive(Debug, Default)]
    struct Designer;

    impl Survey for Designer {
        fn is_design_mode(&self) -> bool {
            true
        }
    }

    fn row_members<S: Survey>(store: &mut ElementStore<S>, c: ElementId) -> Vec<Vec<ElementId>> {
        store.rows(c).iter().map(|r| r.elements().to_vec()).collect()
    }

    #[test]
    fn start_with_new_line_splits_rows() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        let c = store.add_new_question(page, "c");
        let d = store.add_new_question(page, "d");
        store.set_start_with_new_line(b, false);
        store.set_start_with_new_line(d, false);

        assert_eq!(row_members(&mut store, page), vec![vec![a, b], vec![c, d]]);
        assert!(store.rows(page).iter().all(Row::visible));
        assert_eq!(store.rows(page)[0].container(), page);
    }

    #[test]
    fn first_element_always_starts_a_row() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        store.set_start_with_new_line(a, false);

        assert_eq!(row_members(&mut store, page), vec![vec![a]]);
    }

    #[test]
    fn empty_container_has_no_rows() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        assert!(store.rows(page).is_empty());
    }

    #[test]
    fn visible_members_share_the_width() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        let c = store.add_new_question(page, "c");
        store.set_start_with_new_line(b, false);
        store.set_start_with_new_line(c, false);
        let _ = store.rows(page);

        for q in [a, b, c] {
            assert_eq!(store.render_width(q), "33%");
        }
        assert_eq!(
            [a, b, c].map(|q| store.right_indent(q)),
            [1, 1, 0],
            "only the last visible member has no right indent"
        );

        store.set_visible(b, false);
        store.set_visible(c, false);
        assert_eq!(store.render_width(a), "100%");
        assert_eq!(store.right_indent(a), 0);
    }

    #[test]
    fn explicit_width_wins() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        store.set_start_with_new_line(b, false);
        store.set_width(a, Some("40%".into()));
        let _ = store.rows(page);

        assert_eq!(store.render_width(a), "40%");
        assert_eq!(store.render_width(b), "50%");

        store.set_width(b, Some("60%".into()));
        let _ = store.rows(page);
        assert_eq!(store.cache_stats(page).row_rebuilds, 1, "width alone never rebuilds");
        assert_eq!(store.render_width(b), "50%", "applied on the next row layout");

        store.set_visible(a, false);
        assert_eq!(store.render_width(b), "60%");
    }

    #[test]
    fn visibility_updates_rows_without_rebuild() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        let _ = store.rows(page);
        let _ = store.take_changes();

        store.set_visible(b, false);
        let changes = store.take_changes();
        assert_eq!(changes.row_visibility, vec![(page, 1)]);
        assert!(changes.rows_changed.is_empty(), "no rebuild for visibility");
        assert!(!store.rows(page)[1].visible());
        assert!(store.rows(page)[0].visible());
        assert_eq!(store.cache_stats(page).row_rebuilds, 1);

        store.set_visible(a, false);
        assert!(!store.rows(page)[0].visible());
    }

    #[test]
    fn start_with_new_line_change_rebuilds() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        assert_eq!(store.rows(page).len(), 2);

        store.set_start_with_new_line(b, false);
        assert_eq!(row_members(&mut store, page), vec![vec![a, b]]);
        assert_eq!(store.cache_stats(page).row_rebuilds, 2);
    }

    #[test]
    fn layout_changes_are_queued() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let a = store.add_new_question(page, "a");
        let b = store.add_new_question(page, "b");
        store.set_start_with_new_line(b, false);
        let _ = store.rows(page);
        assert_eq!(store.take_changes().layout, vec![a, b]);

        store.set_visible(b, false);
        assert_eq!(store.take_changes().layout, vec![a], "a widened to 100%");
    }

    #[test]
    fn hidden_row_is_visible_in_design_mode() {
        let mut store = ElementStore::with_survey(Designer);
        let page = store.create_panel("page");
        store.connect(page);
        let inner = store.add_new_panel(page, "empty");

        assert!(store.is_visible(inner), "empty container shows in design mode");
        assert!(store.rows(page)[0].visible());
    }
}
