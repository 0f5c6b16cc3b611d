//! Opcode identities and operand-shape metadata.
//!
//! Out of scope per `spec.md` §1 ("the opcode table and operand metadata"),
//! but every rewriter dispatches on it, so it has to exist as a concrete,
//! process-wide immutable table (`spec.md` §5). Only the opcodes `spec.md`
//! §6 names are modeled, plus a small family of generic pure arithmetic ops
//! used to exercise the dead-code-elimination reverse pass (`spec.md` §4.7,
//! scenario 5) and `Nop`, used only as `delete_ins` bookkeeping filler —
//! never produced by a rewrite.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One opcode in the spesh instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Findmeth,
    SpFindmeth,
    SpGetSpeshSlot,
    Istype,
    ConstI64,
    Set,
    Decont,
    Goto,
    IfI,
    UnlessI,
    IfS,
    IfN,
    IfO,
    UnlessS,
    UnlessN,
    UnlessO,
    SsaPhi,
    /// Generic pure integer binop, used by tests/the demo CLI to exercise
    /// dead-store elimination; real spesh has many of these (`add_i`,
    /// `sub_i`, ...) but this crate only needs one shape.
    AddI,
    /// Placeholder used only by [`crate::manipulate::delete_ins`]-adjacent
    /// bookkeeping; a live graph should never contain one after a pass.
    Nop,
}

bitflags! {
    /// Per-operand read/write/literal classification. An operand can be a
    /// register read, a register write, or one of several literal kinds;
    /// `spec.md` §3 calls these out as mutually exclusive per operand
    /// position, so in practice exactly one bit is set per entry in an
    /// [`OpcodeInfo::operand_kinds`] slice, but the type is a bitflags set
    /// (rather than a plain enum) because `spec.md` §6 talks about an
    /// "operand read/write mask" — the mask shape matters for the reverse
    /// DCE pass's read-register test in `spec.md` §4.7.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OperandKind: u8 {
        const READ_REG    = 0b0000_0001;
        const WRITE_REG    = 0b0000_0010;
        const LIT_I16      = 0b0000_0100;
        const LIT_I64      = 0b0000_1000;
        const LIT_STR_IDX  = 0b0001_0000;
        const INS_BB       = 0b0010_0000;
    }
}

impl OperandKind {
    pub fn is_register(self) -> bool {
        self.intersects(OperandKind::READ_REG | OperandKind::WRITE_REG)
    }
}

/// Static descriptor for one opcode: its operand shape and purity.
#[derive(Debug, Clone)]
pub struct OpcodeInfo {
    pub opcode: Opcode,
    pub operand_kinds: &'static [OperandKind],
    /// "Pure": the instruction's only observable effect is writing its
    /// output register (`spec.md` GLOSSARY). Only pure instructions with
    /// an unused result are eligible for the DCE reverse pass.
    pub pure: bool,
}

macro_rules! kinds {
    ($($k:expr),* $(,)?) => { &[$($k),*] as &'static [OperandKind] };
}

static OPCODE_TABLE: Lazy<HashMap<Opcode, OpcodeInfo>> = Lazy::new(|| {
    use Opcode::*;
    use OperandKind as K;
    let mut m = HashMap::new();
    let mut add = |info: OpcodeInfo| {
        m.insert(info.opcode, info);
    };

    // findmeth dst, obj, name_idx
    add(OpcodeInfo {
        opcode: Findmeth,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG, K::LIT_STR_IDX],
        pure: false,
    });
    // sp_findmeth dst, obj, name_idx, cache_slot_index
    add(OpcodeInfo {
        opcode: SpFindmeth,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG, K::LIT_STR_IDX, K::LIT_I16],
        pure: false,
    });
    // sp_getspeshslot dst, slot_index — operand 1 is a LITERAL, not a
    // register: this is the §9 Open Question (b) resolution. If this were
    // misclassified as READ_REG the use-count invariant in spec.md §8
    // would break the moment this rewrite fires.
    add(OpcodeInfo {
        opcode: SpGetSpeshSlot,
        operand_kinds: kinds![K::WRITE_REG, K::LIT_I16],
        pure: false,
    });
    // istype dst, obj, type
    add(OpcodeInfo {
        opcode: Istype,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG, K::READ_REG],
        pure: false,
    });
    // const_i64 dst, lit_i64
    add(OpcodeInfo {
        opcode: ConstI64,
        operand_kinds: kinds![K::WRITE_REG, K::LIT_I64],
        pure: true,
    });
    // set dst, src
    add(OpcodeInfo {
        opcode: Set,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG],
        pure: true,
    });
    // decont dst, obj
    add(OpcodeInfo {
        opcode: Decont,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG],
        pure: false,
    });
    // goto target
    add(OpcodeInfo {
        opcode: Goto,
        operand_kinds: kinds![K::INS_BB],
        pure: false,
    });
    // if_i / unless_i flag, target
    for op in [IfI, UnlessI] {
        add(OpcodeInfo {
            opcode: op,
            operand_kinds: kinds![K::READ_REG, K::INS_BB],
            pure: false,
        });
    }
    // non-integer if/unless family: same shape, recognized but ignored by
    // optimize_iffy (spec.md §4.6, §9 open question (a)).
    for op in [IfS, IfN, IfO, UnlessS, UnlessN, UnlessO] {
        add(OpcodeInfo {
            opcode: op,
            operand_kinds: kinds![K::READ_REG, K::INS_BB],
            pure: false,
        });
    }
    // SSA_PHI dst, src1, src2, ... — modeled here with a fixed 3-operand
    // shape (one write, two reads); optimize_bb's reverse pass treats
    // every operand from index 1 onward as a read regardless of the
    // descriptor (spec.md §4.7), so the exact arity here is cosmetic.
    add(OpcodeInfo {
        opcode: SsaPhi,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG, K::READ_REG],
        pure: false,
    });
    // add_i dst, lhs, rhs — pure, generic arithmetic for DCE tests.
    add(OpcodeInfo {
        opcode: AddI,
        operand_kinds: kinds![K::WRITE_REG, K::READ_REG, K::READ_REG],
        pure: true,
    });
    add(OpcodeInfo {
        opcode: Nop,
        operand_kinds: kinds![],
        pure: true,
    });

    m
});

/// Looks up the static descriptor for an opcode. Panics if the opcode is
/// unknown to the table — that can only happen if this crate itself is
/// missing an entry, which is a programmer error, not a runtime condition.
pub fn info(opcode: Opcode) -> &'static OpcodeInfo {
    OPCODE_TABLE
        .get(&opcode)
        .unwrap_or_else(|| panic!("no OpcodeInfo registered for {opcode:?}"))
}
