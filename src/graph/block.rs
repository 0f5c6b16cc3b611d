//! Basic blocks (`spec.md` §3 "Basic Block").

use super::{BbId, InsId};

/// A maximal straight-line instruction sequence with a single entry and a
/// single exit (`spec.md` GLOSSARY). Invariants from `spec.md` §3: the
/// entry block has `idx == 0`; every block except entry appears in
/// `linear_next` order exactly once; every block reachable from entry via
/// `succ` must be reachable via `linear_next` after [`crate::optimize::dce::eliminate_dead`].
#[derive(Debug, Clone)]
pub struct BasicBlock {
    /// Dense index, stable only between reindex passes (`spec.md` §3, §4.8).
    pub idx: u32,
    pub first_ins: Option<InsId>,
    pub last_ins: Option<InsId>,
    /// Textual-order successor, independent of control flow. `None` for the
    /// last block in the chain.
    pub linear_next: Option<BbId>,
    pub succ: Vec<BbId>,
    pub pred: Vec<BbId>,
    /// Dominator-tree children, populated by the (external) analysis pass.
    pub children: Vec<BbId>,
}

impl BasicBlock {
    pub fn new(idx: u32) -> Self {
        BasicBlock {
            idx,
            first_ins: None,
            last_ins: None,
            linear_next: None,
            succ: Vec::new(),
            pred: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_empty_of_instructions(&self) -> bool {
        self.first_ins.is_none()
    }
}
