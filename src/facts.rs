//! Per-operand analysis summary (`spec.md` §3 "Facts").
//!
//! Populated by the external fact-discovery pass (out of scope, `spec.md`
//! §1); this crate only reads and mutates an already-populated table. The
//! `usages` counter is the load-bearing invariant the whole pass must
//! preserve (`spec.md` §8 "Use-count conservation").

use bitflags::bitflags;

use crate::oracle::TypeId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FactFlags: u8 {
        const KNOWN_TYPE  = 0b0001;
        const KNOWN_VALUE = 0b0010;
        const DECONTED    = 0b0100;
        const TYPEOBJ     = 0b1000;
    }
}

/// The statically known value of a register, valid only when
/// [`FactFlags::KNOWN_VALUE`] is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnownValue {
    I64(i64),
}

/// Everything known about one `(orig, i)` register slot.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    pub flags: FactFlags,
    pub ty: Option<TypeId>,
    pub value: Option<KnownValue>,
    /// Number of remaining live reads of this SSA value. Must equal the
    /// count of read-register operands referring to `(orig, i)` across all
    /// instructions currently in the graph (`spec.md` §3, §8).
    pub usages: u32,
}

impl Default for FactFlags {
    fn default() -> Self {
        FactFlags::empty()
    }
}

impl Facts {
    pub fn known_type(ty: TypeId, usages: u32) -> Self {
        Facts {
            flags: FactFlags::KNOWN_TYPE,
            ty: Some(ty),
            value: None,
            usages,
        }
    }

    pub fn known_value(value: KnownValue, usages: u32) -> Self {
        Facts {
            flags: FactFlags::KNOWN_VALUE,
            ty: None,
            value: Some(value),
            usages,
        }
    }

    /// True if *all* of `flags` are set. For "is any of these set" (the
    /// `decont` rewriter's "DECONTED or TYPEOBJ" test in `spec.md` §4.5),
    /// use [`Facts::has_any`] instead.
    pub fn has(&self, flags: FactFlags) -> bool {
        self.flags.contains(flags)
    }

    /// True if *any* of `flags` is set.
    pub fn has_any(&self, flags: FactFlags) -> bool {
        self.flags.intersects(flags)
    }
}

/// The two-dimensional `facts[orig][i]` table from `spec.md` §3. Indexed
/// by register origin (`orig`) then SSA version (`i`); origins and
/// versions are allocated densely by the (external) analysis pass, so a
/// plain nested `Vec` mirrors the C layout rather than introducing a hash
/// lookup on the DCE hot path.
#[derive(Debug, Default)]
pub struct FactTable {
    origins: Vec<Vec<Facts>>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures storage for `(orig, i)` exists, default-initializing any
    /// gaps, then returns a mutable reference. Used by graph builders
    /// (tests, the demo CLI) that populate facts out of order.
    pub fn ensure_mut(&mut self, orig: u32, i: u32) -> &mut Facts {
        let orig = orig as usize;
        let i = i as usize;
        if self.origins.len() <= orig {
            self.origins.resize_with(orig + 1, Vec::new);
        }
        let versions = &mut self.origins[orig];
        if versions.len() <= i {
            versions.resize_with(i + 1, Facts::default);
        }
        &mut versions[i]
    }

    pub fn get(&self, orig: u32, i: u32) -> &Facts {
        &self.origins[orig as usize][i as usize]
    }

    pub fn get_mut(&mut self, orig: u32, i: u32) -> &mut Facts {
        &mut self.origins[orig as usize][i as usize]
    }

    /// Decrements the usage counter for `(orig, i)`. Saturating: a
    /// well-formed pass never calls this more times than there were live
    /// reads, but saturating keeps a stray extra decrement from
    /// underflowing into a giant `u32` during debugging.
    pub fn dec_usage(&mut self, orig: u32, i: u32) {
        let f = self.get_mut(orig, i);
        f.usages = f.usages.saturating_sub(1);
    }

    /// Iterates every populated `(orig, i)` slot and its [`Facts`],
    /// regardless of whether any read-register operand currently refers to
    /// it. Used by [`crate::graph::SpeshGraph::debug_assert_usages_consistent`]
    /// so a register with zero surviving reads but a stale non-zero
    /// `usages` counter is still visited — a plain "count the reads seen"
    /// map has no entry at all for such a register and would miss it.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32, &Facts)> + '_ {
        self.origins.iter().enumerate().flat_map(|(orig, versions)| {
            versions
                .iter()
                .enumerate()
                .map(move |(i, facts)| (orig as u32, i as u32, facts))
        })
    }
}
