// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container title and body text.

use alloc::format;
use alloc::string::String;

use super::id::ElementId;
use super::store::ElementStore;
use crate::survey::Survey;

impl<S: Survey> ElementStore<S> {
    /// Returns a container's raw title.
    #[must_use]
    pub fn title(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.panel(id.idx).title
    }

    /// Sets a container's raw title.
    pub fn set_title(&mut self, id: ElementId, title: impl Into<String>) {
        self.validate(id);
        self.panel_mut(id.idx).title = title.into();
    }

    /// Returns a container's raw body text.
    #[must_use]
    pub fn body(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.panel(id.idx).body
    }

    /// Sets a container's raw body text.
    pub fn set_body(&mut self, id: ElementId, body: impl Into<String>) {
        self.validate(id);
        self.panel_mut(id.idx).body = body.into();
    }

    /// Returns the title as it should be displayed.
    ///
    /// Connected containers route the text through
    /// [`Survey::process_text`]. In design mode an empty title renders as
    /// `[name]`.
    #[must_use]
    pub fn processed_title(&self, id: ElementId) -> String {
        self.validate(id);
        self.render_text(id.idx, &self.panel(id.idx).title)
    }

    /// Returns the body as it should be displayed, following the same rules
    /// as [`processed_title`](Self::processed_title).
    #[must_use]
    pub fn processed_body(&self, id: ElementId) -> String {
        self.validate(id);
        self.render_text(id.idx, &self.panel(id.idx).body)
    }

    fn render_text(&self, idx: u32, text: &str) -> String {
        if text.is_empty() && self.is_design_mode_at(idx) {
            return format!("[{}]", self.name[idx as usize]);
        }
        if self.connected[idx as usize] {
            self.survey.process_text(text)
        } else {
            text.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Templating {
        design: bool,
    }

    impl Survey for Templating {
        fn process_text(&self, text: &str) -> String {
            text.replace("{user}", "Ana")
        }

        fn is_design_mode(&self) -> bool {
            self.design
        }
    }

    #[test]
    fn detached_text_is_returned_unchanged() {
        let mut store = ElementStore::with_survey(Templating::default());
        let p = store.create_panel("p");
        store.set_title(p, "Hello {user}");
        assert_eq!(store.processed_title(p), "Hello {user}");
        assert_eq!(store.title(p), "Hello {user}");
    }

    #[test]
    fn connected_text_goes_through_the_survey() {
        let mut store = ElementStore::with_survey(Templating::default());
        let p = store.create_panel("p");
        store.connect(p);
        store.set_title(p, "Hello {user}");
        store.set_body(p, "Bye {user}");
        assert_eq!(store.processed_title(p), "Hello Ana");
        assert_eq!(store.processed_body(p), "Bye Ana", "body renders the body");
    }

    #[test]
    fn design_mode_shows_placeholder_for_empty_text() {
        let mut store = ElementStore::with_survey(Templating { design: true });
        let p = store.create_panel("contact");
        store.connect(p);
        assert_eq!(store.processed_title(p), "[contact]");
        assert_eq!(store.processed_body(p), "[contact]");

        store.set_title(p, "Contact");
        assert_eq!(store.processed_title(p), "Contact");
    }

    #[test]
    fn empty_text_outside_design_mode_stays_empty() {
        let mut store = ElementStore::with_survey(Templating::default());
        let p = store.create_panel("contact");
        store.connect(p);
        assert_eq!(store.processed_title(p), "");
    }
}
