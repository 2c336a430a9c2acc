// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree data model.
//!
//! An *element* is a node in a form page. It is either a leaf **question** or
//! a **container** (a panel, or the root container of a page) that owns an
//! ordered list of child elements. Each element has:
//!
//! - An identity ([`ElementId`]), a generational handle that becomes stale
//!   when the element is destroyed.
//! - Topology: a non-owning parent index and, for containers, an ordered
//!   child list.
//! - **Local properties** set by the caller: [`visible`](ElementStore::set_visible),
//!   [`start_with_new_line`](ElementStore::set_start_with_new_line),
//!   [`width`](ElementStore::set_width), [`visible_if`](ElementStore::set_visible_if),
//!   and for containers title, body, and inner indent.
//! - **Derived state**, rebuilt lazily: the flattened
//!   [`questions`](ElementStore::questions) list and the [`rows`](ElementStore::rows)
//!   layout of each container, plus the `render_width` / `right_indent` the
//!   row layout assigns to visible members.
//!
//! # Invalidation
//!
//! Every structural mutation funnels through one procedure that marks the
//! container's question list dirty (propagating to all ancestors, see
//! [`dirty`](crate::dirty)) and drops its row cache. Visibility writes do not
//! rebuild anything: they re-lay-out only the one row holding the element in
//! each ancestor.
//!
//! # Notifications
//!
//! Survey bookkeeping ([`Survey`](crate::survey::Survey)) is called during the
//! mutation, after caches are invalidated. Everything else observable is
//! queued and handed out by [`take_changes`](ElementStore::take_changes).

mod changes;
mod id;
mod rows;
mod store;
mod text;
mod traverse;
mod visibility;

pub use changes::FormChanges;
pub use id::{ElementId, INVALID, IdAllocator};
pub use rows::Row;
pub use store::{CacheStats, ElementKind, ElementStore};
pub(crate) use store::INNER_INDENT_CHOICES;
pub use traverse::Elements;
pub use visibility::ConditionPolicy;
