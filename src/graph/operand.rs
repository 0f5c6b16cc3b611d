//! Tagged operand values (`spec.md` §3 "Operand").

use super::BbId;

/// A single instruction operand. Exactly one variant per operand position,
/// matching the read/write/literal classification each [`crate::opcode::OpcodeInfo`]
/// declares for that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register read or write; which one depends on the opcode's operand
    /// descriptor for this position, not on the operand itself.
    Reg { orig: u32, i: u32 },
    LitI16(i16),
    LitI64(i64),
    LitStrIdx(u32),
    /// Branch target, a pointer to a basic block in C; here an index.
    InsBb(BbId),
}

impl Operand {
    pub fn reg(orig: u32, i: u32) -> Self {
        Operand::Reg { orig, i }
    }

    pub fn as_reg(self) -> Option<(u32, u32)> {
        match self {
            Operand::Reg { orig, i } => Some((orig, i)),
            _ => None,
        }
    }

    pub fn as_bb(self) -> Option<BbId> {
        match self {
            Operand::InsBb(bb) => Some(bb),
            _ => None,
        }
    }

    pub fn as_lit_i64(self) -> Option<i64> {
        match self {
            Operand::LitI64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_lit_str_idx(self) -> Option<u32> {
        match self {
            Operand::LitStrIdx(v) => Some(v),
            _ => None,
        }
    }
}
