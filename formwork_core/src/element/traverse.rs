// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child iteration and the flattened question list.

use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::slice;

use tracing::trace;

use super::id::ElementId;
use super::store::{ElementStore, Payload};
use crate::dirty;
use crate::survey::Survey;

/// Iterator over the direct children of a container, in order.
///
/// Created by [`ElementStore::elements`].
#[derive(Clone, Debug)]
pub struct Elements<'a> {
    generation: &'a [u32],
    children: slice::Iter<'a, u32>,
}

impl<'a> Elements<'a> {
    pub(crate) fn new(generation: &'a [u32], children: &'a [u32]) -> Self {
        Self {
            generation,
            children: children.iter(),
        }
    }

    fn handle(&self, idx: u32) -> ElementId {
        ElementId {
            idx,
            generation: self.generation[idx as usize],
        }
    }
}

impl Iterator for Elements<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let idx = *self.children.next()?;
        Some(self.handle(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl DoubleEndedIterator for Elements<'_> {
    fn next_back(&mut self) -> Option<ElementId> {
        let idx = *self.children.next_back()?;
        Some(self.handle(idx))
    }
}

impl ExactSizeIterator for Elements<'_> {}

impl FusedIterator for Elements<'_> {}

impl<S: Survey> ElementStore<S> {
    /// Returns every question in the subtree of `container`, depth-first in
    /// element order.
    ///
    /// The list is cached per container and rebuilt only after a structural
    /// change somewhere in the subtree.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn questions(&mut self, container: ElementId) -> &[ElementId] {
        self.validate(container);
        let _ = self.panel(container.idx);
        self.sync_question_dirty();
        self.ensure_questions(container.idx);
        &self.panel(container.idx).questions
    }

    /// Appends the questions in the subtree of `container` to `list`.
    ///
    /// With `visible_only`, elements whose own visible flag is off are skipped
    /// along with their subtree, and nothing is appended if `container` itself
    /// is hidden.
    pub fn add_questions_to_list(
        &self,
        container: ElementId,
        list: &mut Vec<ElementId>,
        visible_only: bool,
    ) {
        self.validate(container);
        let _ = self.panel(container.idx);
        if visible_only && !self.visible[container.idx as usize] {
            return;
        }
        self.collect_questions(container.idx, list, visible_only);
    }

    fn collect_questions(&self, c: u32, list: &mut Vec<ElementId>, visible_only: bool) {
        for &child in &self.panel(c).children {
            if visible_only && !self.visible[child as usize] {
                continue;
            }
            if self.is_panel_at(child) {
                self.collect_questions(child, list, visible_only);
            } else {
                list.push(self.handle(child));
            }
        }
    }

    /// Moves dirty marks from the tracker into the per-container ready flags.
    fn sync_question_dirty(&mut self) {
        let dirty: Vec<u32> = self
            .dirty
            .drain(dirty::QUESTIONS)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in dirty {
            if let Payload::Panel(panel) = &mut self.payload[idx as usize] {
                panel.questions_ready = false;
            }
        }
    }

    fn ensure_questions(&mut self, c: u32) {
        if self.panel(c).questions_ready {
            return;
        }
        let mut list = Vec::new();
        for i in 0..self.panel(c).children.len() {
            let child = self.panel(c).children[i];
            if self.is_panel_at(child) {
                self.ensure_questions(child);
                list.extend_from_slice(&self.panel(child).questions);
            } else {
                list.push(self.handle(child));
            }
        }
        trace!(container = c, count = list.len(), "rebuilt question list");
        let panel = self.panel_mut(c);
        panel.questions = list;
        panel.questions_ready = true;
        panel.stats.question_rebuilds += 1;
    }
}
