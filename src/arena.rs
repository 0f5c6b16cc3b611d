//! Bump-style arena for instruction operand arrays.
//!
//! Stands in for the out-of-scope bump allocator `spec.md` §1 hands off to
//! the host VM's thread context. Rewrites that need a freshly sized operand
//! array (the `findmeth` → `sp_findmeth` growth in §4.2, for instance)
//! allocate from here instead of mutating in place; nothing is ever freed
//! individually, matching the graph-scoped lifecycle in `spec.md` §3.

use crate::error::{Result, SpeshError};
use crate::graph::Operand;

/// Owns every operand array allocated during a single optimization pass.
/// Dropped along with the graph it belongs to.
#[derive(Debug, Default)]
pub struct SpeshArena {
    slabs: Vec<Box<[Operand]>>,
}

/// Largest operand array this crate will ever allocate in one call. Real
/// rewrites top out at 4 operands (`sp_findmeth`); this just guards against
/// a runaway caller rather than modeling a real capacity limit.
const MAX_ALLOC: usize = 4096;

impl SpeshArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new operand array of the given length, all slots
    /// initialized to `fill`, and returns an index into the arena along
    /// with a mutable view. The returned index is stable for the arena's
    /// lifetime (append-only, matching the spesh-slot table's own
    /// guarantee in `spec.md` §3).
    pub fn alloc_operands(&mut self, len: usize, fill: Operand) -> Result<usize> {
        if len > MAX_ALLOC {
            return Err(SpeshError::AllocatorExhausted(format!(
                "requested {len} operands, exceeds arena cap {MAX_ALLOC}"
            )));
        }
        self.slabs.push(vec![fill; len].into_boxed_slice());
        Ok(self.slabs.len() - 1)
    }

    pub fn operands(&self, idx: usize) -> &[Operand] {
        &self.slabs[idx]
    }

    pub fn operands_mut(&mut self, idx: usize) -> &mut [Operand] {
        &mut self.slabs[idx]
    }
}
