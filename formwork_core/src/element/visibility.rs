// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility flags, effective visibility, and `visibleIf` conditions.

use alloc::vec::Vec;

use tracing::{debug, warn};

use super::id::{ElementId, INVALID};
use super::store::ElementStore;
use crate::condition::Values;
use crate::error::{ConditionError, RunConditionError};
use crate::survey::Survey;

/// How [`run_condition_with`](ElementStore::run_condition_with) reacts to a
/// failing condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConditionPolicy {
    /// Keep evaluating the rest of the tree and report every failure.
    #[default]
    BestEffort,
    /// Stop at the first failure.
    FailFast,
}

impl<S: Survey> ElementStore<S> {
    /// Returns the element's own visible flag.
    #[must_use]
    pub fn visible(&self, id: ElementId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Sets the element's own visible flag.
    ///
    /// Writing the current value does nothing. A change is queued in
    /// [`FormChanges::visibility`](super::FormChanges::visibility) and the row
    /// holding the element is re-laid-out in each ancestor.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        self.validate(id);
        let idx = id.idx;
        if self.visible[idx as usize] == visible {
            return;
        }
        self.visible[idx as usize] = visible;
        self.pending.visibility.push(id);
        self.bubble_visibility(idx);
    }

    /// Returns whether the element is effectively visible.
    ///
    /// A question is visible when its flag is set. A container additionally
    /// needs at least one visible question somewhere below it, unless it is
    /// connected to a survey in design mode.
    #[must_use]
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.validate(id);
        self.is_visible_at(id.idx)
    }

    /// Returns whether a container would still be visible to a respondent if
    /// `except` were hidden.
    ///
    /// Design mode is ignored.
    #[must_use]
    pub fn is_visible_except(&self, container: ElementId, except: ElementId) -> bool {
        self.validate(container);
        let _ = self.panel(container.idx);
        self.visible[container.idx as usize]
            && self.has_visible_question(container.idx, Some(except.idx))
    }

    /// Evaluates `visibleIf` for every element in the subtree of `container`,
    /// setting each one's visible flag from the result.
    ///
    /// Children are evaluated in order before their container, questions and
    /// nested containers alike. An element without an expression (or with a
    /// blank one) keeps its flag. An element whose condition fails keeps its
    /// visibility; evaluation continues with the rest of the tree and all
    /// failures are returned together.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn run_condition(
        &mut self,
        container: ElementId,
        values: &Values,
    ) -> Result<(), RunConditionError> {
        self.run_condition_with(container, values, ConditionPolicy::BestEffort)
    }

    /// Like [`run_condition`](Self::run_condition), with an explicit failure
    /// policy.
    pub fn run_condition_with(
        &mut self,
        container: ElementId,
        values: &Values,
        policy: ConditionPolicy,
    ) -> Result<(), RunConditionError> {
        self.validate(container);
        let _ = self.panel(container.idx);
        let mut failures = Vec::new();
        self.run_condition_at(container.idx, values, policy, &mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RunConditionError { failures })
        }
    }

    /// Returns `false` when the pass must stop.
    fn run_condition_at(
        &mut self,
        idx: u32,
        values: &Values,
        policy: ConditionPolicy,
        failures: &mut Vec<(ElementId, ConditionError)>,
    ) -> bool {
        if self.is_panel_at(idx) {
            for i in 0..self.panel(idx).children.len() {
                let child = self.panel(idx).children[i];
                if !self.run_condition_at(child, values, policy, failures) {
                    return false;
                }
            }
        }

        let i = idx as usize;
        let expression = &self.visible_if[i];
        if expression.trim().is_empty() {
            return true;
        }
        let factory = self.evaluator_factory;
        let runner = self.runner[i].get_or_insert_with(|| factory(expression));
        runner.set_expression(expression);
        let result = runner.run(values);

        let id = self.handle(idx);
        match result {
            Ok(visible) => {
                debug!(element = ?id, visible, "condition evaluated");
                self.set_visible(id, visible);
                true
            }
            Err(err) => {
                warn!(element = ?id, %err, "condition failed; keeping visibility");
                failures.push((id, err));
                policy == ConditionPolicy::BestEffort
            }
        }
    }

    pub(crate) fn is_visible_at(&self, idx: u32) -> bool {
        if !self.visible[idx as usize] {
            return false;
        }
        if !self.is_panel_at(idx) {
            return true;
        }
        self.is_design_mode_at(idx) || self.has_visible_question(idx, None)
    }

    fn has_visible_question(&self, c: u32, except: Option<u32>) -> bool {
        self.panel(c).children.iter().any(|&child| {
            if self.is_panel_at(child) {
                self.has_visible_question(child, except)
            } else {
                Some(child) != except && self.visible[child as usize]
            }
        })
    }

    /// Refreshes the row holding `idx` in each ancestor container.
    pub(crate) fn bubble_visibility(&mut self, mut idx: u32) {
        loop {
            let p = self.parent[idx as usize];
            if p == INVALID {
                break;
            }
            self.update_row_containing(p, idx);
            idx = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use serde_json::json;

    use super::*;
    use crate::condition::ConditionEvaluator;

    fn values(v: serde_json::Value) -> Values {
        match v {
            serde_json::Value::Object(map) => map,
            _ => panic!("test values must be an object"),
        }
    }

    #[test]
    fn set_visible_is_idempotent() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let q = store.add_new_question(page, "q");
        let _ = store.rows(page);
        let _ = store.take_changes();

        store.set_visible(q, true);
        assert!(store.take_changes().is_empty(), "same value queues nothing");

        store.set_visible(q, false);
        store.set_visible(q, false);
        assert_eq!(store.take_changes().visibility, vec![q], "exactly one change");
    }

    #[test]
    fn container_visibility_is_an_or_over_questions() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let panel = store.add_new_panel(page, "panel");
        let q1 = store.add_new_question(panel, "q1");
        let q2 = store.add_new_question(panel, "q2");
        let other = store.add_new_question(page, "other");
        store.set_visible(q1, false);
        store.set_visible(q2, false);
        assert!(!store.is_visible(panel));

        assert_eq!(store.rows(page).len(), 2);
        assert!(!store.rows(page)[0].visible());
        let _ = store.take_changes();

        store.set_visible(q2, true);
        assert!(store.is_visible(panel));
        let changes = store.take_changes();
        assert_eq!(changes.row_visibility, vec![(page, 0)], "only the panel's row flips");
        assert!(store.rows(page)[0].visible());
        assert!(store.rows(page)[1].elements().contains(&other));
        assert_eq!(store.cache_stats(page).row_rebuilds, 1, "no rebuild");
    }

    #[test]
    fn hidden_flag_wins_over_questions() {
        let mut store = ElementStore::new();
        let panel = store.create_panel("panel");
        let _ = store.add_new_question(panel, "q");
        assert!(store.is_visible(panel));
        store.set_visible(panel, false);
        assert!(!store.is_visible(panel));
    }

    #[test]
    fn empty_container_is_hidden_outside_design_mode() {
        let mut store = ElementStore::new();
        let panel = store.create_panel("panel");
        assert!(!store.is_visible(panel));
    }

    #[test]
    fn visible_except_ignores_one_question() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let q1 = store.add_new_question(page, "q1");
        let q2 = store.add_new_question(page, "q2");
        store.set_visible(q2, false);

        assert!(!store.is_visible_except(page, q1));
        assert!(store.is_visible_except(page, q2));
    }

    #[test]
    fn structural_change_refreshes_ancestor_rows() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let panel = store.add_new_panel(page, "panel");
        assert!(!store.rows(page)[0].visible(), "empty panel row is hidden");

        let _ = store.add_new_question(panel, "q");
        assert!(store.rows(page)[0].visible(), "row follows the new question");
    }

    #[test]
    fn condition_sets_visibility() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let panel = store.add_new_panel(page, "panel");
        let _ = store.add_new_question(panel, "age");
        store.set_visible_if(panel, "{age} >= 18");
        let _ = store.take_changes();

        store
            .run_condition(page, &values(json!({ "age": 20 })))
            .expect("condition evaluates");
        assert!(store.visible(panel));
        assert!(store.take_changes().visibility.is_empty(), "already visible");

        store
            .run_condition(page, &values(json!({ "age": 10 })))
            .expect("condition evaluates");
        assert!(!store.visible(panel));
        assert_eq!(store.take_changes().visibility, vec![panel]);
    }

    #[test]
    fn empty_condition_leaves_visibility_alone() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        store.set_visible(page, false);
        store
            .run_condition(page, &values(json!({})))
            .expect("nothing to evaluate");
        assert!(!store.visible(page));
    }

    #[test]
    fn blank_condition_leaves_visibility_alone() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let q = store.add_new_question(page, "q");
        store.set_visible(q, false);
        store.set_visible_if(q, "  \t ");
        store.set_visible_if(page, " ");
        store
            .run_condition(page, &values(json!({})))
            .expect("blank expressions are not evaluated");
        assert!(!store.visible(q));
        assert!(store.visible(page));
    }

    #[test]
    fn question_conditions_are_evaluated() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let _ = store.add_new_question(page, "has_pets");
        let inner = store.add_new_panel(page, "details");
        let pet_name = store.add_new_question(inner, "pet_name");
        store.set_visible_if(pet_name, "{has_pets} = true");
        let _ = store.rows(inner);
        let _ = store.rows(page);
        let _ = store.take_changes();

        store
            .run_condition(page, &values(json!({ "has_pets": false })))
            .expect("condition evaluates");
        assert!(!store.visible(pet_name));
        assert!(!store.is_visible(inner), "container hides with its only question");
        let changes = store.take_changes();
        assert_eq!(changes.visibility, vec![pet_name]);
        assert_eq!(changes.row_visibility, vec![(inner, 0), (page, 1)]);

        store
            .run_condition(page, &values(json!({ "has_pets": true })))
            .expect("condition evaluates");
        assert!(store.visible(pet_name));
        assert!(store.is_visible(inner));
    }

    #[test]
    fn question_failure_is_reported_with_its_handle() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let q = store.add_new_question(page, "q");
        store.set_visible_if(q, "{a} >");

        let err = store
            .run_condition(page, &values(json!({ "a": 1 })))
            .expect_err("malformed question condition");
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].0, q);
        assert!(store.visible(q), "failed question keeps its visibility");
    }

    #[test]
    fn failures_are_collected_and_keep_visibility() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let bad = store.add_new_panel(page, "bad");
        let good = store.add_new_panel(page, "good");
        let worse = store.add_new_panel(page, "worse");
        store.set_visible_if(bad, "{a} >=");
        store.set_visible_if(good, "{a} = 2");
        store.set_visible_if(worse, "((");

        let err = store
            .run_condition(page, &values(json!({ "a": 1 })))
            .expect_err("two conditions are malformed");
        let failed: Vec<ElementId> = err.failures.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![bad, worse]);
        assert!(store.visible(bad), "failed container keeps its visibility");
        assert!(!store.visible(good), "later siblings are still evaluated");
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let mut store = ElementStore::new();
        let page = store.create_panel("page");
        let bad = store.add_new_panel(page, "bad");
        let good = store.add_new_panel(page, "good");
        store.set_visible_if(bad, "{a} >=");
        store.set_visible_if(good, "{a} = 2");

        let err = store
            .run_condition_with(page, &values(json!({ "a": 1 })), ConditionPolicy::FailFast)
            .expect_err("malformed condition");
        assert_eq!(err.failures.len(), 1);
        assert!(store.visible(good), "evaluation stopped before 'good'");
    }

    #[test]
    fn evaluator_is_built_once_per_element() {
        use core::sync::atomic::{AtomicUsize, Ordering};

        static BUILT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct Always(bool);

        impl ConditionEvaluator for Always {
            fn set_expression(&mut self, expression: &str) {
                self.0 = expression == "yes";
            }

            fn run(&mut self, _: &Values) -> Result<bool, ConditionError> {
                Ok(self.0)
            }
        }

        fn factory(expression: &str) -> Box<dyn ConditionEvaluator> {
            BUILT.fetch_add(1, Ordering::Relaxed);
            Box::new(Always(expression == "yes"))
        }

        let mut store = ElementStore::new();
        store.set_evaluator_factory(factory);
        let page = store.create_panel("page");
        store.set_visible_if(page, "no");
        let data = Values::new();

        store.run_condition(page, &data).expect("custom evaluator");
        assert!(!store.visible(page));
        store.set_visible_if(page, "yes");
        store.run_condition(page, &data).expect("custom evaluator");
        assert!(store.visible(page), "evaluator follows the new expression");
        assert_eq!(BUILT.load(Ordering::Relaxed), 1);
    }
}
