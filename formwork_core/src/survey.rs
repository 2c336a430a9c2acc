// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract with the survey that owns a tree of containers.
//!
//! The survey is the outer orchestration layer: it tracks the current page,
//! stores answers, keeps a global question registry, and renders text. None
//! of that lives in this crate. The element store only calls the narrow
//! [`Survey`] trait below, and only for elements that are
//! [connected](crate::element::ElementStore::connect) to it.
//!
//! All methods default to no-ops (or identity), so a test double only needs
//! to override what it observes.

use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::element::ElementId;

/// Receives structural notifications and answers mode queries for a tree of
/// containers.
pub trait Survey {
    /// A question was inserted at `index` in `container`, which belongs to the
    /// tree rooted at `root`.
    fn question_added(
        &mut self,
        question: ElementId,
        index: usize,
        container: ElementId,
        root: ElementId,
    ) {
        _ = (question, index, container, root);
    }

    /// A nested container was inserted at `index` in `container`.
    fn panel_added(&mut self, panel: ElementId, index: usize, container: ElementId, root: ElementId) {
        _ = (panel, index, container, root);
    }

    /// A question was removed from its container.
    fn question_removed(&mut self, question: ElementId) {
        _ = question;
    }

    /// A nested container was removed from its container.
    fn panel_removed(&mut self, panel: ElementId) {
        _ = panel;
    }

    /// Expands embedded data references in title or body text.
    fn process_text(&self, text: &str) -> String {
        text.to_owned()
    }

    /// Whether the survey is being edited in a designer.
    ///
    /// In design mode empty containers stay visible and empty titles render as
    /// a `[name]` placeholder.
    fn is_design_mode(&self) -> bool {
        false
    }

    /// Whether the survey is currently being loaded from JSON.
    fn is_loading_from_json(&self) -> bool {
        false
    }

    /// Root container of the page the respondent is on, if any.
    fn current_page(&self) -> Option<ElementId> {
        None
    }
}

/// A [`Survey`] that ignores every notification.
///
/// Stores created with [`ElementStore::new`](crate::element::ElementStore::new)
/// use this until a real survey is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSurvey;

impl Survey for NoSurvey {}
