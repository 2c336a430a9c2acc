// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree, row layout, and visibility propagation for data-driven forms.
//!
//! `formwork_core` models the part of a survey engine that sits between the
//! JSON definition of a page and its renderer: a tree of questions and nested
//! containers, the flattened list of questions in each subtree, the grouping
//! of a container's children into horizontal rows, and the visibility rules
//! that decide which rows a respondent sees. It is `no_std` compatible (with
//! `alloc`) and uses array-based struct-of-arrays storage with index handles.
//!
//! # Architecture
//!
//! ```text
//!   JSON ──► ElementStore::from_json() ──► element tree
//!                                              │
//!            add / remove / set_* ─────────────┤
//!                                              ▼
//!            invalidate_structure ──► QUESTIONS channel + row cache
//!                                              │
//!            questions() / rows() ◄────────────┘  (lazy rebuild)
//!                                              │
//!            run_condition(values) ──► set_visible ──► row re-layout
//!                                              │
//!            take_changes() ──► FormChanges ──► view
//! ```
//!
//! **[`element`]**: Struct-of-arrays element tree with generational handles,
//! the lazily rebuilt question list and row layout, visibility, text, and the
//! queued [`FormChanges`](element::FormChanges).
//!
//! **[`dirty`]**: Dirty tracking via `understory_dirty`. Structural edits mark
//! the `QUESTIONS` channel, which propagates to every ancestor container.
//!
//! **[`condition`]**: The [`ConditionEvaluator`](condition::ConditionEvaluator)
//! seam and the built-in [`ExpressionRunner`](condition::ExpressionRunner) used
//! for `visibleIf`.
//!
//! **[`survey`]**: The [`Survey`](survey::Survey) trait through which the
//! owning survey receives add/remove notifications and supplies design mode,
//! loading state, and text processing.
//!
//! **[`json`]**: Lossless (de)serialization of element trees.
//!
//! **[`error`]**: Error types for condition evaluation and JSON loading.
//!
//! # Example
//!
//! ```
//! use formwork_core::element::ElementStore;
//!
//! let mut store = ElementStore::new();
//! let page = store.create_panel("page");
//! let first = store.add_new_question(page, "first_name");
//! let last = store.add_new_question(page, "last_name");
//! store.set_start_with_new_line(last, false);
//!
//! assert_eq!(store.rows(page).len(), 1);
//! assert_eq!(store.render_width(first), "50%");
//! assert_eq!(store.questions(page), [first, last]);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod condition;
pub mod dirty;
pub mod element;
pub mod error;
pub mod json;
pub mod survey;
