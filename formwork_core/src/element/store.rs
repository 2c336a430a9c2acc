// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage with allocation, topology, and property
//! management.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use tracing::{debug, warn};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::changes::FormChanges;
use super::id::{ElementId, INVALID, IdAllocator};
use super::rows::Row;
use super::traverse::Elements;
use crate::condition::{ConditionEvaluator, EvaluatorFactory, expression_runner};
use crate::dirty;
use crate::json::PANEL_TYPE;
use crate::survey::{NoSurvey, Survey};

/// Allowed values of a container's inner indent.
pub(crate) const INNER_INDENT_CHOICES: &[u8] = &[0, 1, 2, 3];

/// Question type given to questions created without one.
pub(crate) const DEFAULT_QUESTION_TYPE: &str = "text";

/// Which variant of element a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A leaf question.
    Question,
    /// A container of nested elements.
    Panel,
}

/// Rebuild counters for a container's derived caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Times the flattened question list was rebuilt.
    pub question_rebuilds: u32,
    /// Times the row layout was rebuilt.
    pub row_rebuilds: u32,
}

/// Variant-specific state.
#[derive(Debug)]
pub(crate) enum Payload {
    Question(QuestionData),
    Panel(Box<PanelData>),
}

#[derive(Debug)]
pub(crate) struct QuestionData {
    pub(crate) question_type: String,
}

impl Default for QuestionData {
    fn default() -> Self {
        Self {
            question_type: DEFAULT_QUESTION_TYPE.into(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct PanelData {
    pub(crate) id: String,
    pub(crate) children: Vec<u32>,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) inner_indent: u8,

    // -- Derived caches --
    pub(crate) questions: Vec<ElementId>,
    pub(crate) questions_ready: bool,
    pub(crate) rows: Option<Vec<Row>>,
    pub(crate) stats: CacheStats,
}

impl PanelData {
    fn new(id: String) -> Self {
        Self {
            id,
            children: Vec::new(),
            title: String::new(),
            body: String::new(),
            inner_indent: 0,
            questions: Vec::new(),
            questions_ready: false,
            rows: None,
            stats: CacheStats::default(),
        }
    }
}

/// Struct-of-arrays storage for all elements of one survey.
///
/// Elements are addressed by [`ElementId`] handles. Internally, each element
/// occupies a slot in parallel arrays. Destroyed elements are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// The store is generic over the [`Survey`] that receives notifications for
/// [connected](Self::connect) elements.
#[derive(Debug)]
pub struct ElementStore<S = NoSurvey> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) name: Vec<String>,
    pub(crate) visible: Vec<bool>,
    pub(crate) start_with_new_line: Vec<bool>,
    pub(crate) width: Vec<Option<String>>,
    pub(crate) visible_if: Vec<String>,

    // -- Computed layout (written by row layout) --
    pub(crate) render_width: Vec<String>,
    pub(crate) right_indent: Vec<u32>,

    // -- Variant state --
    pub(crate) payload: Vec<Payload>,
    pub(crate) runner: Vec<Option<Box<dyn ConditionEvaluator>>>,

    // -- Survey binding --
    pub(crate) connected: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Collaborators --
    pub(crate) survey: S,
    pub(crate) ids: IdAllocator,
    pub(crate) evaluator_factory: EvaluatorFactory,
    pub(crate) loading: bool,

    // -- Queued notifications --
    pub(crate) pending: FormChanges,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Creates an empty store that is not attached to any survey.
    #[must_use]
    pub fn new() -> Self {
        Self::with_survey(NoSurvey)
    }
}

impl<S: Survey> ElementStore<S> {
    /// Creates an empty store reporting to `survey`.
    #[must_use]
    pub fn with_survey(survey: S) -> Self {
        Self {
            parent: Vec::new(),
            name: Vec::new(),
            visible: Vec::new(),
            start_with_new_line: Vec::new(),
            width: Vec::new(),
            visible_if: Vec::new(),
            render_width: Vec::new(),
            right_indent: Vec::new(),
            payload: Vec::new(),
            runner: Vec::new(),
            connected: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            survey,
            ids: IdAllocator::new(),
            evaluator_factory: expression_runner,
            loading: false,
            pending: FormChanges::default(),
        }
    }

    /// Replaces the container id sequence.
    ///
    /// Pass a clone of another store's allocator to share one sequence.
    #[must_use]
    pub fn with_id_allocator(mut self, ids: IdAllocator) -> Self {
        self.ids = ids;
        self
    }

    /// Returns the container id sequence.
    #[must_use]
    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }

    /// Replaces the evaluator factory used for `visibleIf` conditions.
    ///
    /// Elements that already built an evaluator keep it.
    pub fn set_evaluator_factory(&mut self, factory: EvaluatorFactory) {
        self.evaluator_factory = factory;
    }

    /// Returns the survey.
    #[must_use]
    pub fn survey(&self) -> &S {
        &self.survey
    }

    /// Returns the survey mutably.
    pub fn survey_mut(&mut self) -> &mut S {
        &mut self.survey
    }

    // -- Allocation API --

    /// Creates a detached question of the default type.
    pub fn create_question(&mut self, name: impl Into<String>) -> ElementId {
        self.allocate(name.into(), Payload::Question(QuestionData::default()))
    }

    /// Creates a detached, empty container with a fresh `sp_<n>` id.
    pub fn create_panel(&mut self, name: impl Into<String>) -> ElementId {
        let id = self.ids.next_panel_id();
        self.allocate(name.into(), Payload::Panel(Box::new(PanelData::new(id))))
    }

    /// Destroys a detached element and its whole subtree, freeing the slots
    /// for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the element still has a parent (remove it first) or if the
    /// handle is stale.
    pub fn destroy_element(&mut self, id: ElementId) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize] == INVALID,
            "cannot destroy an attached element"
        );
        for idx in self.subtree(id.idx) {
            self.dirty.remove_key(idx);
            // Drop caches and any evaluator.
            self.payload[idx as usize] = Payload::Question(QuestionData::default());
            self.runner[idx as usize] = None;
            self.parent[idx as usize] = INVALID;
            self.connected[idx as usize] = false;
            // Bump generation so old handles immediately fail validation.
            self.generation[idx as usize] += 1;
            self.free_list.push(idx);
        }
    }

    /// Returns whether the given handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns which variant the element is.
    #[must_use]
    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.validate(id);
        match self.payload[id.idx as usize] {
            Payload::Question(_) => ElementKind::Question,
            Payload::Panel(_) => ElementKind::Panel,
        }
    }

    // -- Topology API --

    /// Returns the container holding an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns the outermost container above an element (itself if detached).
    #[must_use]
    pub fn root(&self, id: ElementId) -> ElementId {
        self.validate(id);
        self.handle(self.root_idx(id.idx))
    }

    /// Returns an iterator over the direct children of a container.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    #[must_use]
    pub fn elements(&self, container: ElementId) -> Elements<'_> {
        self.validate(container);
        Elements::new(&self.generation, &self.panel(container.idx).children)
    }

    /// Returns the number of direct children of a container.
    #[must_use]
    pub fn element_count(&self, container: ElementId) -> usize {
        self.validate(container);
        self.panel(container.idx).children.len()
    }

    /// Returns the position of `element` among the direct children of
    /// `container`.
    #[must_use]
    pub fn index_of(&self, container: ElementId, element: ElementId) -> Option<usize> {
        self.validate(container);
        if !self.is_alive(element) {
            return None;
        }
        self.panel(container.idx)
            .children
            .iter()
            .position(|&c| c == element.idx)
    }

    /// Inserts `element` into `container` at `index`, appending when `index`
    /// is `None` or past the end.
    ///
    /// `index` is a position in the child list after `element` has been
    /// detached from its current parent. Moving within the same container
    /// therefore lands the element at `index` of the resulting list: on
    /// `[a, b, c]`, moving `a` to `Some(1)` gives `[b, a, c]`, and
    /// `Some(2)` gives `[b, c, a]`.
    ///
    /// A dead handle is ignored. An element that already has a parent is
    /// detached from it first. Returns `false` without changing anything if
    /// the element is dead or if `element` is `container` or one of its
    /// ancestors.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn add_element(
        &mut self,
        container: ElementId,
        element: ElementId,
        index: Option<usize>,
    ) -> bool {
        self.validate(container);
        let c = container.idx;
        let _ = self.panel(c);
        if !self.is_alive(element) {
            debug!(?container, ?element, "ignoring add of a dead element");
            return false;
        }
        let e = element.idx;
        if e == c || self.is_ancestor(e, c) {
            warn!(?container, ?element, "refusing to add a container into its own subtree");
            return false;
        }

        if self.parent[e as usize] != INVALID {
            self.detach(self.parent[e as usize], e);
        }

        let children = &mut self.panel_mut(c).children;
        let len = children.len();
        let index = index.filter(|&i| i < len).unwrap_or(len);
        children.insert(index, e);
        self.parent[e as usize] = c;

        self.set_connected_subtree(e, self.connected[c as usize]);
        let is_panel = self.is_panel_at(e);
        if is_panel {
            // The container's flattened list embeds the nested container's.
            let _ = self.dirty.add_dependency(c, e, dirty::QUESTIONS);
        }

        self.invalidate_structure(c);

        if self.connected[c as usize] {
            let root = self.handle(self.root_idx(c));
            if is_panel {
                self.survey.panel_added(element, index, container, root);
            } else {
                self.survey.question_added(element, index, container, root);
            }
        }
        true
    }

    /// Alias of [`add_element`](Self::add_element) for questions.
    pub fn add_question(
        &mut self,
        container: ElementId,
        question: ElementId,
        index: Option<usize>,
    ) -> bool {
        self.add_element(container, question, index)
    }

    /// Alias of [`add_element`](Self::add_element) for containers.
    pub fn add_panel(&mut self, container: ElementId, panel: ElementId, index: Option<usize>) -> bool {
        self.add_element(container, panel, index)
    }

    /// Creates a question and appends it to `container`.
    pub fn add_new_question(&mut self, container: ElementId, name: impl Into<String>) -> ElementId {
        let question = self.create_question(name);
        self.add_element(container, question, None);
        question
    }

    /// Creates a container and appends it to `container`.
    pub fn add_new_panel(&mut self, container: ElementId, name: impl Into<String>) -> ElementId {
        let panel = self.create_panel(name);
        self.add_element(container, panel, None);
        panel
    }

    /// Removes `element` from `container` or from any container nested in it.
    ///
    /// Direct children are searched first. The removed element stays alive
    /// and detached. Returns whether anything was removed.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn remove_element(&mut self, container: ElementId, element: ElementId) -> bool {
        self.validate(container);
        let _ = self.panel(container.idx);
        if !self.is_alive(element) {
            return false;
        }
        self.remove_from(container.idx, element.idx)
    }

    /// Alias of [`remove_element`](Self::remove_element) for questions.
    pub fn remove_question(&mut self, container: ElementId, question: ElementId) -> bool {
        self.remove_element(container, question)
    }

    /// Removes up to `count` direct children of `container` starting at
    /// `start`, returning them in their former order.
    ///
    /// The range is clamped to the child list: a `start` past the end or a
    /// `count` of zero removes nothing. Each removal invalidates and notifies
    /// exactly like [`remove_element`](Self::remove_element), and the removed
    /// elements stay alive and detached.
    ///
    /// # Panics
    ///
    /// Panics if `container` is stale or is a question.
    pub fn remove_at(&mut self, container: ElementId, start: usize, count: usize) -> Vec<ElementId> {
        self.validate(container);
        let c = container.idx;
        let children = &self.panel(c).children;
        let end = start.saturating_add(count).min(children.len());
        let removed: Vec<u32> = children[start.min(end)..end].to_vec();
        for &e in &removed {
            self.detach(c, e);
        }
        removed.into_iter().map(|e| self.handle(e)).collect()
    }

    /// Returns whether `element` is anywhere in the subtree of `container`.
    #[must_use]
    pub fn contains_element(&self, container: ElementId, element: ElementId) -> bool {
        self.validate(container);
        let _ = self.panel(container.idx);
        self.is_alive(element) && self.contains_at(container.idx, element.idx)
    }

    // -- Survey binding --

    /// Binds an element and its subtree to the store's survey.
    ///
    /// Only connected elements notify the survey, consult its design mode, or
    /// route text through it. Elements added to a connected container become
    /// connected.
    pub fn connect(&mut self, id: ElementId) {
        self.validate(id);
        self.set_connected_subtree(id.idx, true);
    }

    /// Unbinds an element and its subtree from the survey.
    pub fn disconnect(&mut self, id: ElementId) {
        self.validate(id);
        self.set_connected_subtree(id.idx, false);
    }

    /// Returns whether the element is bound to the survey.
    #[must_use]
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.validate(id);
        self.connected[id.idx as usize]
    }

    /// Returns whether the element is connected and the survey is in design
    /// mode.
    #[must_use]
    pub fn is_design_mode(&self, id: ElementId) -> bool {
        self.validate(id);
        self.is_design_mode_at(id.idx)
    }

    /// Signals that the survey finished loading.
    ///
    /// Recurses into nested containers and reports every container's rows as
    /// changed so that views lay out from scratch.
    pub fn on_survey_load(&mut self, container: ElementId) {
        self.validate(container);
        let _ = self.panel(container.idx);
        for idx in self.subtree(container.idx) {
            if self.is_panel_at(idx) {
                let id = self.handle(idx);
                self.pending.rows_changed.push(id);
            }
        }
    }

    /// Returns whether the element's page is the survey's current page.
    ///
    /// Elements not connected to a survey are always active.
    #[must_use]
    pub fn is_active(&self, id: ElementId) -> bool {
        self.validate(id);
        if !self.connected[id.idx as usize] {
            return true;
        }
        let root = self.handle(self.root_idx(id.idx));
        self.survey.current_page() == Some(root)
    }

    // -- Property API --

    /// Returns the element's name.
    #[must_use]
    pub fn name(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Renames an element.
    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) {
        self.validate(id);
        self.name[id.idx as usize] = name.into();
    }

    /// Returns a container's process-unique `sp_<n>` id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or is a question.
    #[must_use]
    pub fn panel_id(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.panel(id.idx).id
    }

    /// Returns a question's type, or `None` for containers.
    #[must_use]
    pub fn question_type(&self, id: ElementId) -> Option<&str> {
        self.validate(id);
        match &self.payload[id.idx as usize] {
            Payload::Question(q) => Some(&q.question_type),
            Payload::Panel(_) => None,
        }
    }

    /// Sets a question's type. Ignored for containers.
    ///
    /// `"panel"` is reserved for containers and is refused, leaving the type
    /// unchanged.
    pub fn set_question_type(&mut self, id: ElementId, question_type: impl Into<String>) {
        self.validate(id);
        let question_type = question_type.into();
        if question_type == PANEL_TYPE {
            warn!(?id, "refusing the container type for a question");
            return;
        }
        if let Payload::Question(q) = &mut self.payload[id.idx as usize] {
            q.question_type = question_type;
        }
    }

    /// Returns whether the element starts a new row.
    #[must_use]
    pub fn start_with_new_line(&self, id: ElementId) -> bool {
        self.validate(id);
        self.start_with_new_line[id.idx as usize]
    }

    /// Sets whether the element starts a new row.
    ///
    /// A change drops the parent's row layout, which is rebuilt on the next
    /// [`rows`](Self::rows) read.
    pub fn set_start_with_new_line(&mut self, id: ElementId, value: bool) {
        self.validate(id);
        let idx = id.idx as usize;
        if self.start_with_new_line[idx] == value {
            return;
        }
        self.start_with_new_line[idx] = value;
        let p = self.parent[idx];
        if p != INVALID {
            self.invalidate_rows(p);
        }
    }

    /// Returns the explicit width, if any.
    #[must_use]
    pub fn width(&self, id: ElementId) -> Option<&str> {
        self.validate(id);
        self.width[id.idx as usize].as_deref()
    }

    /// Sets the explicit width (for example `"40%"`). An empty string clears it.
    ///
    /// Takes effect the next time the element's row is laid out.
    pub fn set_width(&mut self, id: ElementId, width: Option<String>) {
        self.validate(id);
        self.width[id.idx as usize] = width.filter(|w| !w.is_empty());
    }

    /// Returns the width assigned by the row layout.
    #[must_use]
    pub fn render_width(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.render_width[id.idx as usize]
    }

    /// Returns the trailing indent assigned by the row layout.
    #[must_use]
    pub fn right_indent(&self, id: ElementId) -> u32 {
        self.validate(id);
        self.right_indent[id.idx as usize]
    }

    /// Returns a container's inner indent.
    #[must_use]
    pub fn inner_indent(&self, id: ElementId) -> u8 {
        self.validate(id);
        self.panel(id.idx).inner_indent
    }

    /// Sets a container's inner indent, clamped to the allowed choices
    /// (`0..=3`).
    pub fn set_inner_indent(&mut self, id: ElementId, indent: u8) {
        self.validate(id);
        let max = INNER_INDENT_CHOICES[INNER_INDENT_CHOICES.len() - 1];
        let indent = indent.min(max);
        let panel = self.panel_mut(id.idx);
        if panel.inner_indent == indent {
            return;
        }
        panel.inner_indent = indent;
        self.pending.layout.push(id);
    }

    /// Returns the element's `visibleIf` expression (empty if none).
    #[must_use]
    pub fn visible_if(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.visible_if[id.idx as usize]
    }

    /// Sets the element's `visibleIf` expression. An empty string removes it.
    pub fn set_visible_if(&mut self, id: ElementId, expression: impl Into<String>) {
        self.validate(id);
        self.visible_if[id.idx as usize] = expression.into();
    }

    /// Returns the rebuild counters of a container's caches.
    #[must_use]
    pub fn cache_stats(&self, id: ElementId) -> CacheStats {
        self.validate(id);
        self.panel(id.idx).stats
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ElementId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ElementId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> ElementId {
        ElementId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn is_panel_at(&self, idx: u32) -> bool {
        matches!(self.payload[idx as usize], Payload::Panel(_))
    }

    /// Returns container state, panicking if `idx` is a question.
    pub(crate) fn panel(&self, idx: u32) -> &PanelData {
        match &self.payload[idx as usize] {
            Payload::Panel(p) => p,
            Payload::Question(_) => panic!("element {idx} is not a container"),
        }
    }

    pub(crate) fn panel_mut(&mut self, idx: u32) -> &mut PanelData {
        match &mut self.payload[idx as usize] {
            Payload::Panel(p) => p,
            Payload::Question(_) => panic!("element {idx} is not a container"),
        }
    }

    pub(crate) fn root_idx(&self, mut idx: u32) -> u32 {
        while self.parent[idx as usize] != INVALID {
            idx = self.parent[idx as usize];
        }
        idx
    }

    pub(crate) fn is_design_mode_at(&self, idx: u32) -> bool {
        self.connected[idx as usize] && self.survey.is_design_mode()
    }

    pub(crate) fn is_loading(&self, idx: u32) -> bool {
        self.loading || (self.connected[idx as usize] && self.survey.is_loading_from_json())
    }

    /// Returns `idx` and all of its descendants in depth-first pre-order.
    pub(crate) fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![idx];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Payload::Panel(p) = &self.payload[next as usize] {
                stack.extend(p.children.iter().rev());
            }
        }
        out
    }

    /// The single invalidation path for structural change in container `c`.
    ///
    /// Marks the question lists of `c` and every ancestor dirty, drops the row
    /// layout of `c`, and refreshes the row holding `c` in each ancestor (its
    /// effective visibility may have changed with its contents).
    pub(crate) fn invalidate_structure(&mut self, c: u32) {
        self.dirty.mark_with(c, dirty::QUESTIONS, &EagerPolicy);
        self.invalidate_rows(c);
        self.bubble_visibility(c);
    }

    /// Drops the row layout of container `c`.
    pub(crate) fn invalidate_rows(&mut self, c: u32) {
        self.panel_mut(c).rows = None;
        if !self.is_loading(c) {
            let id = self.handle(c);
            self.pending.rows_changed.push(id);
        }
    }

    fn allocate(&mut self, name: String, payload: Payload) -> ElementId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.name[i] = name;
            self.visible[i] = true;
            self.start_with_new_line[i] = true;
            self.width[i] = None;
            self.visible_if[i] = String::new();
            self.render_width[i] = String::new();
            self.right_indent[i] = 0;
            self.payload[i] = payload;
            self.runner[i] = None;
            self.connected[i] = false;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.name.push(name);
            self.visible.push(true);
            self.start_with_new_line.push(true);
            self.width.push(None);
            self.visible_if.push(String::new());
            self.render_width.push(String::new());
            self.right_indent.push(0);
            self.payload.push(payload);
            self.runner.push(None);
            self.connected.push(false);
            self.generation.push(0);
            idx
        };
        self.handle(idx)
    }

    /// Whether `ancestor` is strictly above `idx`.
    fn is_ancestor(&self, ancestor: u32, mut idx: u32) -> bool {
        while self.parent[idx as usize] != INVALID {
            idx = self.parent[idx as usize];
            if idx == ancestor {
                return true;
            }
        }
        false
    }

    fn set_connected_subtree(&mut self, idx: u32, connected: bool) {
        for i in self.subtree(idx) {
            self.connected[i as usize] = connected;
        }
    }

    fn remove_from(&mut self, c: u32, e: u32) -> bool {
        if self.panel(c).children.contains(&e) {
            self.detach(c, e);
            return true;
        }
        let nested: Vec<u32> = self
            .panel(c)
            .children
            .iter()
            .copied()
            .filter(|&child| self.is_panel_at(child))
            .collect();
        nested.into_iter().any(|n| self.remove_from(n, e))
    }

    fn contains_at(&self, c: u32, e: u32) -> bool {
        self.panel(c)
            .children
            .iter()
            .any(|&child| child == e || (self.is_panel_at(child) && self.contains_at(child, e)))
    }

    /// Unlinks direct child `e` from container `c`, then invalidates and
    /// notifies.
    fn detach(&mut self, c: u32, e: u32) {
        let children = &mut self.panel_mut(c).children;
        if let Some(pos) = children.iter().position(|&child| child == e) {
            children.remove(pos);
        }
        self.parent[e as usize] = INVALID;

        let is_panel = self.is_panel_at(e);
        if is_panel {
            self.dirty.remove_dependency(c, e, dirty::QUESTIONS);
        }

        self.invalidate_structure(c);

        if self.connected[c as usize] {
            let element = self.handle(e);
            if is_panel {
                self.survey.panel_removed(element);
            } else {
                self.survey.question_removed(element);
            }
        }
    }
}
