// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Survey`] that records every notification.
//!
//! [`RecordingSurvey`] stands in for a real survey during development and in
//! tests. It keeps the structural notifications it receives as
//! [`SurveyEvent`]s, and its mode flags (design mode, loading, current page)
//! and text substitutions can be set directly.

use formwork_core::element::ElementId;
use formwork_core::survey::Survey;

/// One notification received by a [`RecordingSurvey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurveyEvent {
    /// [`Survey::question_added`].
    QuestionAdded {
        /// The added question.
        element: ElementId,
        /// Position in `container`.
        index: usize,
        /// Immediate container.
        container: ElementId,
        /// Root of the tree.
        root: ElementId,
    },
    /// [`Survey::panel_added`].
    PanelAdded {
        /// The added container.
        element: ElementId,
        /// Position in `container`.
        index: usize,
        /// Immediate container.
        container: ElementId,
        /// Root of the tree.
        root: ElementId,
    },
    /// [`Survey::question_removed`].
    QuestionRemoved {
        /// The removed question.
        element: ElementId,
    },
    /// [`Survey::panel_removed`].
    PanelRemoved {
        /// The removed container.
        element: ElementId,
    },
}

impl SurveyEvent {
    /// Short event name, as used in exports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuestionAdded { .. } => "QuestionAdded",
            Self::PanelAdded { .. } => "PanelAdded",
            Self::QuestionRemoved { .. } => "QuestionRemoved",
            Self::PanelRemoved { .. } => "PanelRemoved",
        }
    }

    /// The element the event is about.
    #[must_use]
    pub fn element(&self) -> ElementId {
        match *self {
            Self::QuestionAdded { element, .. }
            | Self::PanelAdded { element, .. }
            | Self::QuestionRemoved { element }
            | Self::PanelRemoved { element } => element,
        }
    }
}

/// A [`Survey`] that records notifications and answers mode queries from
/// settable flags.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurvey {
    events: Vec<SurveyEvent>,
    design_mode: bool,
    loading: bool,
    current_page: Option<ElementId>,
    substitutions: Vec<(String, String)>,
}

impl RecordingSurvey {
    /// Creates an empty recorder in runtime (non-design) mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[SurveyEvent] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn take_events(&mut self) -> Vec<SurveyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sets the value reported by [`Survey::is_design_mode`].
    pub fn set_design_mode(&mut self, design_mode: bool) {
        self.design_mode = design_mode;
    }

    /// Sets the value reported by [`Survey::is_loading_from_json`].
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Sets the value reported by [`Survey::current_page`].
    pub fn set_current_page(&mut self, page: Option<ElementId>) {
        self.current_page = page;
    }

    /// Makes [`Survey::process_text`] replace `pattern` with `replacement`.
    ///
    /// Substitutions apply in the order they were added.
    pub fn substitute(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        self.substitutions.push((pattern.into(), replacement.into()));
    }
}

impl Survey for RecordingSurvey {
    fn question_added(
        &mut self,
        question: ElementId,
        index: usize,
        container: ElementId,
        root: ElementId,
    ) {
        self.events.push(SurveyEvent::QuestionAdded {
            element: question,
            index,
            container,
            root,
        });
    }

    fn panel_added(&mut self, panel: ElementId, index: usize, container: ElementId, root: ElementId) {
        self.events.push(SurveyEvent::PanelAdded {
            element: panel,
            index,
            container,
            root,
        });
    }

    fn question_removed(&mut self, question: ElementId) {
        self.events
            .push(SurveyEvent::QuestionRemoved { element: question });
    }

    fn panel_removed(&mut self, panel: ElementId) {
        self.events.push(SurveyEvent::PanelRemoved { element: panel });
    }

    fn process_text(&self, text: &str) -> String {
        self.substitutions
            .iter()
            .fold(text.to_owned(), |acc, (pattern, replacement)| {
                acc.replace(pattern.as_str(), replacement)
            })
    }

    fn is_design_mode(&self) -> bool {
        self.design_mode
    }

    fn is_loading_from_json(&self) -> bool {
        self.loading
    }

    fn current_page(&self) -> Option<ElementId> {
        self.current_page
    }
}

#[cfg(test)]
mod tests {
    use formwork_core::element::ElementStore;

    use super::*;

    #[test]
    fn records_structural_notifications() {
        let mut store = ElementStore::with_survey(RecordingSurvey::new());
        let page = store.create_panel("page");
        store.connect(page);
        let panel = store.add_new_panel(page, "panel");
        let q = store.add_new_question(panel, "q");
        store.remove_element(page, q);

        assert_eq!(
            store.survey().events(),
            [
                SurveyEvent::PanelAdded {
                    element: panel,
                    index: 0,
                    container: page,
                    root: page,
                },
                SurveyEvent::QuestionAdded {
                    element: q,
                    index: 0,
                    container: panel,
                    root: page,
                },
                SurveyEvent::QuestionRemoved { element: q },
            ]
        );
        assert_eq!(store.survey_mut().take_events().len(), 3);
        assert!(store.survey().events().is_empty());
    }

    #[test]
    fn loading_flag_suppresses_rows_changed() {
        let mut store = ElementStore::with_survey(RecordingSurvey::new());
        let page = store.create_panel("page");
        store.connect(page);
        store.survey_mut().set_loading(true);
        let _ = store.add_new_question(page, "q");
        assert!(store.take_changes().rows_changed.is_empty());

        store.survey_mut().set_loading(false);
        let _ = store.add_new_question(page, "r");
        assert_eq!(store.take_changes().rows_changed, [page]);
    }

    #[test]
    fn substitutions_apply_to_connected_text() {
        let mut store = ElementStore::with_survey(RecordingSurvey::new());
        store.survey_mut().substitute("{name}", "Ana");
        let page = store.create_panel("page");
        store.connect(page);
        store.set_title(page, "Hi {name}");
        assert_eq!(store.processed_title(page), "Hi Ana");
    }

    #[test]
    fn on_survey_load_reports_every_container() {
        let mut store = ElementStore::with_survey(RecordingSurvey::new());
        let page = store.create_panel("page");
        let inner = store.add_new_panel(page, "inner");
        let _ = store.add_new_question(inner, "q");
        let _ = store.take_changes();

        store.on_survey_load(page);
        assert_eq!(store.take_changes().rows_changed, [page, inner]);
    }
}
