//! Instructions (`spec.md` §3 "Instruction").

use super::InsId;
use crate::opcode::{info, Opcode, OperandKind};

use super::operand::Operand;

/// One instruction. Intra-block ordering is carried by `prev`/`next`
/// (`spec.md` §3); this crate addresses instructions by [`InsId`] into a
/// per-graph slab rather than following owning pointers, per the "graph
/// with cycles + arena allocation" design note in `spec.md` §9 — the same
/// index-over-pointer choice applies just as well to the intra-block list
/// as it does to the block graph itself.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub id: InsId,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub prev: Option<InsId>,
    pub next: Option<InsId>,
}

impl Instruction {
    pub fn new(id: InsId, opcode: Opcode, operands: Vec<Operand>) -> Self {
        Instruction {
            id,
            opcode,
            operands,
            prev: None,
            next: None,
        }
    }

    pub fn opcode_info(&self) -> &'static crate::opcode::OpcodeInfo {
        info(self.opcode)
    }

    pub fn is_pure(&self) -> bool {
        self.opcode_info().pure
    }

    /// Iterates `(index, kind, operand)` for every operand this
    /// instruction currently carries, zipped against the static descriptor
    /// for its *current* opcode (a rewrite that changes `self.opcode`
    /// naturally changes what the zip yields on the next call).
    pub fn operand_kinds(&self) -> impl Iterator<Item = (usize, OperandKind, Operand)> + '_ {
        let kinds = self.opcode_info().operand_kinds;
        self.operands
            .iter()
            .enumerate()
            .map(move |(idx, op)| (idx, kinds.get(idx).copied().unwrap_or(OperandKind::empty()), *op))
    }
}
