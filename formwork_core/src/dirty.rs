// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Formwork uses [`understory_dirty`] to invalidate the flattened question
//! list of every container touched by a structural edit.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`QUESTIONS`] has dependency edges from each container
//!   to every nested container it directly owns. A structural mutation marks
//!   the mutated container with [`EagerPolicy`](understory_dirty::EagerPolicy),
//!   which reaches every ancestor, since an ancestor's flattened list embeds the
//!   lists of its descendants.
//!
//! Row caches are not tracked here. A container's rows only depend on its own
//! child list, so they are dropped locally by
//! [`ElementStore`](crate::element::ElementStore) when that list changes.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Reading
//! [`questions`](crate::element::ElementStore::questions) drains the channel
//! into per-container flags and rebuilds whatever was marked.

use understory_dirty::Channel;

/// A container's child list (or a descendant's) changed; the flattened
/// question list must be rebuilt.
pub const QUESTIONS: Channel = Channel::new(0);
