//! Compile-time `istype` folding (`spec.md` §4.3).

use log::trace;

use crate::facts::{FactFlags, KnownValue};
use crate::graph::{BbId, InsId, Operand, SpeshGraph};
use crate::opcode::Opcode;
use crate::oracle::{CacheAnswer, TypeCheckOracle};

/// `istype dst, obj, type` → `const_i64 dst, result` when both `obj` and
/// `type` have a known type and the type-check oracle can decide without
/// side effects; left untouched on `Indeterminate`.
pub fn optimize_istype(g: &mut SpeshGraph, _bb: BbId, ins_id: InsId, oracle: &dyn TypeCheckOracle) {
    let (obj_orig, obj_i) = g.ins(ins_id).operands[1].as_reg().expect("istype operand 1 is obj");
    let (type_orig, type_i) = g.ins(ins_id).operands[2]
        .as_reg()
        .expect("istype operand 2 is type");

    let obj_known = g.facts.get(obj_orig, obj_i).has(FactFlags::KNOWN_TYPE);
    let type_known = g.facts.get(type_orig, type_i).has(FactFlags::KNOWN_TYPE);
    if !(obj_known && type_known) {
        return;
    }

    let obj_ty = g.facts.get(obj_orig, obj_i).ty.expect("KNOWN_TYPE implies ty");
    let target_ty = g.facts.get(type_orig, type_i).ty.expect("KNOWN_TYPE implies ty");

    let result = match oracle.try_cache_type_check(obj_ty, target_ty) {
        CacheAnswer::Decided(r) => r,
        CacheAnswer::Indeterminate => return,
    };
    let result_i64 = result as i64;

    let (dst_orig, dst_i) = g.ins(ins_id).operands[0]
        .as_reg()
        .expect("istype operand 0 is dst");

    let ins = g.ins_mut(ins_id);
    ins.opcode = Opcode::ConstI64;
    ins.operands = vec![ins.operands[0], Operand::LitI64(result_i64)];

    // `result_facts->flags |= MVM_SPESH_FACT_KNOWN_VALUE` in
    // `original_source/optimize.c`: OR the new fact in, leave whatever
    // else dst already carried (e.g. a KNOWN_TYPE fact) untouched.
    let dst_facts = g.facts.get_mut(dst_orig, dst_i);
    dst_facts.flags.insert(FactFlags::KNOWN_VALUE);
    dst_facts.value = Some(KnownValue::I64(result_i64));

    g.facts.dec_usage(obj_orig, obj_i);
    g.facts.dec_usage(type_orig, type_i);
    trace!("optimize_istype: folded to const_i64 {result_i64}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{MockOracle, TypeId};

    fn build(g: &mut SpeshGraph) -> InsId {
        g.push_ins(
            g.entry,
            Opcode::Istype,
            vec![Operand::reg(0, 3), Operand::reg(0, 1), Operand::reg(0, 2)],
        )
    }

    fn known_type(g: &mut SpeshGraph, orig: u32, i: u32, ty: TypeId, usages: u32) {
        g.facts.ensure_mut(orig, i).flags = FactFlags::KNOWN_TYPE;
        g.facts.get_mut(orig, i).ty = Some(ty);
        g.facts.get_mut(orig, i).usages = usages;
    }

    #[test]
    fn decided_true_folds_to_const_and_decrements_both_operands() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        known_type(&mut g, 0, 1, TypeId(1), 1);
        known_type(&mut g, 0, 2, TypeId(2), 1);
        g.facts.ensure_mut(0, 3).usages = 2;

        let mut oracle = MockOracle::new();
        oracle.register_type_check(TypeId(1), TypeId(2), CacheAnswer::Decided(true));

        optimize_istype(&mut g, g.entry, ins, &oracle);

        let rewritten = g.ins(ins);
        assert_eq!(rewritten.opcode, Opcode::ConstI64);
        assert_eq!(rewritten.operands[1], Operand::LitI64(1));
        assert!(g.facts.get(0, 3).has(FactFlags::KNOWN_VALUE));
        assert_eq!(g.facts.get(0, 3).value, Some(KnownValue::I64(1)));
        assert_eq!(g.facts.get(0, 3).usages, 2, "dst usages must survive the rewrite");
        assert_eq!(g.facts.get(0, 1).usages, 0);
        assert_eq!(g.facts.get(0, 2).usages, 0);
    }

    /// Dst's pre-existing facts (here a `KNOWN_TYPE` left over from some
    /// prior rewrite) survive the fold — `KNOWN_VALUE` is ORed in, not
    /// substituted for the whole `Facts` record.
    #[test]
    fn fold_ors_known_value_into_existing_dst_facts() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        known_type(&mut g, 0, 1, TypeId(1), 1);
        known_type(&mut g, 0, 2, TypeId(2), 1);
        let prior_ty = TypeId(99);
        known_type(&mut g, 0, 3, prior_ty, 2);

        let mut oracle = MockOracle::new();
        oracle.register_type_check(TypeId(1), TypeId(2), CacheAnswer::Decided(true));

        optimize_istype(&mut g, g.entry, ins, &oracle);

        let dst = g.facts.get(0, 3);
        assert!(dst.has(FactFlags::KNOWN_TYPE), "prior flag must survive");
        assert!(dst.has(FactFlags::KNOWN_VALUE), "new flag must be ORed in");
        assert_eq!(dst.ty, Some(prior_ty), "prior ty must be left alone");
        assert_eq!(dst.value, Some(KnownValue::I64(1)));
        assert_eq!(dst.usages, 2);
    }

    #[test]
    fn decided_false_folds_to_zero() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        known_type(&mut g, 0, 1, TypeId(1), 1);
        known_type(&mut g, 0, 2, TypeId(2), 1);
        g.facts.ensure_mut(0, 3);

        let mut oracle = MockOracle::new();
        oracle.register_type_check(TypeId(1), TypeId(2), CacheAnswer::Decided(false));

        optimize_istype(&mut g, g.entry, ins, &oracle);

        assert_eq!(g.ins(ins).operands[1], Operand::LitI64(0));
    }

    #[test]
    fn indeterminate_leaves_instruction_untouched() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        known_type(&mut g, 0, 1, TypeId(1), 1);
        known_type(&mut g, 0, 2, TypeId(2), 1);

        let oracle = MockOracle::new();
        optimize_istype(&mut g, g.entry, ins, &oracle);

        assert_eq!(g.ins(ins).opcode, Opcode::Istype);
        assert_eq!(g.facts.get(0, 1).usages, 1);
        assert_eq!(g.facts.get(0, 2).usages, 1);
    }

    #[test]
    fn missing_known_type_is_skipped_without_consulting_oracle() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        g.facts.ensure_mut(0, 1).usages = 1;
        g.facts.ensure_mut(0, 2).usages = 1;

        let oracle = MockOracle::new();
        optimize_istype(&mut g, g.entry, ins, &oracle);

        assert_eq!(g.ins(ins).opcode, Opcode::Istype);
    }
}
