// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity types.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;

/// Sentinel value indicating "no element" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an element in an [`ElementStore`](super::ElementStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an element is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl ElementId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@gen{})", self.idx, self.generation)
    }
}

/// Sequence that hands out container ids of the form `sp_<n>`.
///
/// Clones share the same sequence, so several stores built from one allocator
/// never hand out the same id. The sequence is not thread-safe; the element
/// model is single-threaded.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: Rc<Cell<u64>>,
}

impl IdAllocator {
    /// First number handed out by a fresh allocator.
    pub const SEED: u64 = 100;

    /// Creates an allocator seeded at [`SEED`](Self::SEED).
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Self::SEED)
    }

    /// Creates an allocator whose first id uses `seed`.
    #[must_use]
    pub fn starting_at(seed: u64) -> Self {
        Self {
            next: Rc::new(Cell::new(seed)),
        }
    }

    /// Returns the next container id and advances the sequence.
    pub fn next_panel_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("sp_{n}")
    }

    /// Returns the number the next id will use, without advancing.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.get()
    }

    /// Rewinds the sequence to [`SEED`](Self::SEED) for every clone.
    pub fn reset(&self) {
        self.next.set(Self::SEED);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_from_seed() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next_panel_id(), "sp_100");
        assert_eq!(ids.next_panel_id(), "sp_101");
        assert_eq!(ids.peek(), 102);
    }

    #[test]
    fn clones_share_the_sequence() {
        let a = IdAllocator::new();
        let b = a.clone();
        assert_eq!(a.next_panel_id(), "sp_100");
        assert_eq!(b.next_panel_id(), "sp_101", "clone must continue the shared sequence");
    }

    #[test]
    fn reset_rewinds_all_clones() {
        let a = IdAllocator::starting_at(7);
        let b = a.clone();
        let _ = a.next_panel_id();
        b.reset();
        assert_eq!(a.next_panel_id(), "sp_100");
    }
}
