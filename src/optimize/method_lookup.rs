//! Method-lookup specialization (`spec.md` §4.2).

use log::trace;

use crate::facts::FactFlags;
use crate::graph::{BbId, InsId, Operand, SpeshGraph};
use crate::manipulate::add_spesh_slot;
use crate::opcode::Opcode;
use crate::oracle::MethodCacheOracle;

/// `findmeth dst, obj, name_idx` → either `sp_getspeshslot dst, slot` (if
/// the target type is known and the method cache resolves it right off)
/// or `sp_findmeth dst, obj, name_idx, cache_slot` (otherwise, reserving a
/// contiguous `(type, method)` cache pair for the first execution).
pub fn optimize_method_lookup(
    g: &mut SpeshGraph,
    _bb: BbId,
    ins_id: InsId,
    oracle: &dyn MethodCacheOracle,
) {
    let (obj_orig, obj_i, name_idx) = {
        let ins = g.ins(ins_id);
        let obj = ins.operands[1].as_reg().expect("findmeth operand 1 is obj");
        let name_idx = ins.operands[2]
            .as_lit_str_idx()
            .expect("findmeth operand 2 is name_idx");
        (obj.0, obj.1, name_idx)
    };

    let obj_facts = g.facts.get(obj_orig, obj_i);
    let known_type = obj_facts.has(FactFlags::KNOWN_TYPE).then(|| obj_facts.ty).flatten();

    let mut resolved = false;
    if let Some(ty) = known_type {
        let name = g.get_string(name_idx).to_string();
        if let Some(meth) = oracle.find_method_cache_only(ty, &name) {
            let slot = add_spesh_slot(g, Some(meth));
            g.facts.dec_usage(obj_orig, obj_i);

            let ins = g.ins_mut(ins_id);
            ins.opcode = Opcode::SpGetSpeshSlot;
            ins.operands = vec![ins.operands[0], Operand::LitI16(slot as i16)];
            trace!("optimize_method_lookup: resolved -> sp_getspeshslot slot={slot}");
            resolved = true;
        }
    }

    if !resolved {
        let dst = g.ins(ins_id).operands[0];
        let obj = g.ins(ins_id).operands[1];
        let name = g.ins(ins_id).operands[2];

        // Two consecutive NULL slots: the interpreter loads type at `k`
        // and method at `k+1`, so the pair must be allocated atomically in
        // order (spec.md §4.2 rationale).
        let cache_slot = add_spesh_slot(g, None);
        add_spesh_slot(g, None);

        // The grown 4-operand array is a fresh allocation out of the
        // graph's bump arena, never freed individually (spec.md §5).
        let slab = g
            .arena
            .alloc_operands(4, Operand::LitI16(0))
            .expect("sp_findmeth operand array exceeds arena capacity");
        {
            let operands = g.arena.operands_mut(slab);
            operands[0] = dst;
            operands[1] = obj;
            operands[2] = name;
            operands[3] = Operand::LitI16(cache_slot as i16);
        }
        let operands = g.arena.operands(slab).to_vec();

        let ins = g.ins_mut(ins_id);
        ins.opcode = Opcode::SpFindmeth;
        ins.operands = operands;
        trace!("optimize_method_lookup: unresolved -> sp_findmeth cache_slot={cache_slot}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SpeshGraph;
    use crate::oracle::{MockOracle, TypeId};

    fn build(g: &mut SpeshGraph, name_idx: u32) -> InsId {
        let bb = g.entry;
        let name = Operand::LitStrIdx(name_idx);
        g.push_ins(
            bb,
            Opcode::Findmeth,
            vec![Operand::reg(0, 2), Operand::reg(0, 1), name],
        )
    }

    /// Scenario 1 (spec.md §8): monomorphic method lookup resolves at
    /// compile time.
    #[test]
    fn resolves_when_type_and_method_known() {
        let mut g = SpeshGraph::new();
        let name_idx = g.push_string("size");
        let ins = build(&mut g, name_idx);

        let ty = TypeId(42);
        g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_TYPE;
        g.facts.get_mut(0, 1).ty = Some(ty);
        g.facts.get_mut(0, 1).usages = 1;
        g.facts.ensure_mut(0, 2);

        let mut oracle = MockOracle::new();
        let meth = crate::oracle::MethodRef(7);
        oracle.register_method(ty, "size", meth);

        optimize_method_lookup(&mut g, g.entry, ins, &oracle);

        let rewritten = g.ins(ins);
        assert_eq!(rewritten.opcode, Opcode::SpGetSpeshSlot);
        let slot = rewritten.operands[1].as_reg().is_none();
        assert!(slot, "slot index operand must be a literal, not a register");
        assert_eq!(g.facts.get(0, 1).usages, 0);
        assert_eq!(g.slots.len(), 1);
        assert_eq!(g.slots.get(0), Some(meth));
    }

    /// Scenario 2 (spec.md §8): polymorphic lookup reserves a contiguous
    /// cache pair.
    #[test]
    fn reserves_cache_pair_when_unresolved() {
        let mut g = SpeshGraph::new();
        let name_idx = g.push_string("size");
        let ins = build(&mut g, name_idx);

        g.facts.ensure_mut(0, 1).usages = 1;
        g.facts.ensure_mut(0, 2);

        let oracle = MockOracle::new();
        optimize_method_lookup(&mut g, g.entry, ins, &oracle);

        let rewritten = g.ins(ins);
        assert_eq!(rewritten.opcode, Opcode::SpFindmeth);
        assert_eq!(rewritten.operands.len(), 4);
        let cache_slot = match rewritten.operands[3] {
            Operand::LitI16(idx) => idx as usize,
            other => panic!("expected literal cache slot, got {other:?}"),
        };
        assert_eq!(g.slots.len(), 2);
        assert_eq!(g.slots.get(cache_slot), None);
        assert_eq!(g.slots.get(cache_slot + 1), None);
        // Object's usage is untouched: the lookup is unresolved, so the
        // findmeth-derived sp_findmeth still reads `obj` at runtime.
        assert_eq!(g.facts.get(0, 1).usages, 1);
    }
}
