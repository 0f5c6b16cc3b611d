//! Spesh-slot side table (`spec.md` §3 "Spesh-slot table").

use crate::oracle::MethodRef;

/// Append-only array of opaque heap references, opened up here as
/// `Option<MethodRef>` so `NULL` placeholders (`spec.md` §4.2's cache
/// reservation) have an honest Rust representation instead of a sentinel
/// value. Once assigned, an index never changes.
#[derive(Debug, Default)]
pub struct SpeshSlots {
    slots: Vec<Option<MethodRef>>,
}

/// Fixed growth step from `spec.md` §4.1 ("policy: grow by a fixed step of
/// 8"). `Vec::push` already amortizes growth on its own, but the step is
/// kept as a named constant so the policy stays visible at the call site
/// that documents it, matching the explicit `alloc_spesh_slots += 8` in
/// `original_source/optimize.c`.
pub const SLOT_GROWTH_STEP: usize = 8;

impl SpeshSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<MethodRef> {
        self.slots[idx]
    }

    /// Appends `value` and returns its pre-increment index. Stable for the
    /// remainder of the pass; no existing index is invalidated.
    pub fn push(&mut self, value: Option<MethodRef>) -> u16 {
        if self.slots.len() == self.slots.capacity() {
            self.slots.reserve(SLOT_GROWTH_STEP);
        }
        let idx = self.slots.len();
        self.slots.push(value);
        idx as u16
    }
}
