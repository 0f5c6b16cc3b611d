//! Deref elision on `decont` (`spec.md` §4.5).

use crate::facts::FactFlags;
use crate::graph::{BbId, InsId, SpeshGraph};
use crate::opcode::Opcode;

/// `decont dst, obj` becomes `set dst, obj` when `obj`'s facts carry
/// `DECONTED` or `TYPEOBJ` — the value is known not to be a container
/// needing dereference. The operand shape is identical between the two
/// opcodes; only the descriptor changes.
pub fn optimize_decont(g: &mut SpeshGraph, _bb: BbId, ins_id: InsId) {
    let (obj_orig, obj_i) = g.ins(ins_id).operands[1].as_reg().expect("decont operand 1 is obj");
    let obj_facts = g.facts.get(obj_orig, obj_i);
    if obj_facts.has_any(FactFlags::DECONTED | FactFlags::TYPEOBJ) {
        g.ins_mut(ins_id).opcode = Opcode::Set;
    }
}
