//! Copy propagation on `set` (`spec.md` §4.4).

use crate::facts::FactFlags;
use crate::graph::{BbId, InsId, SpeshGraph};

/// `set dst, src` transfers `src`'s `KNOWN_TYPE`/`KNOWN_VALUE` facts to
/// `dst` when present. This is an optimistic copy of analysis information,
/// not removal of the instruction itself — `dst`'s `usages` is untouched,
/// and so is `src`'s.
pub fn optimize_set(g: &mut SpeshGraph, _bb: BbId, ins_id: InsId) {
    let (dst_orig, dst_i) = g.ins(ins_id).operands[0].as_reg().expect("set operand 0 is dst");
    let (src_orig, src_i) = g.ins(ins_id).operands[1].as_reg().expect("set operand 1 is src");

    let src_facts = g.facts.get(src_orig, src_i).clone();

    if src_facts.has(FactFlags::KNOWN_TYPE) {
        let dst_facts = g.facts.get_mut(dst_orig, dst_i);
        dst_facts.flags.insert(FactFlags::KNOWN_TYPE);
        dst_facts.ty = src_facts.ty;
    }
    if src_facts.has(FactFlags::KNOWN_VALUE) {
        let dst_facts = g.facts.get_mut(dst_orig, dst_i);
        dst_facts.flags.insert(FactFlags::KNOWN_VALUE);
        dst_facts.value = src_facts.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::KnownValue;
    use crate::graph::{Operand, SpeshGraph};
    use crate::opcode::Opcode;
    use crate::oracle::TypeId;

    fn build(g: &mut SpeshGraph) -> InsId {
        g.push_ins(g.entry, Opcode::Set, vec![Operand::reg(0, 2), Operand::reg(0, 1)])
    }

    #[test]
    fn propagates_known_value_without_touching_usages() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_VALUE;
        g.facts.get_mut(0, 1).value = Some(KnownValue::I64(42));
        g.facts.get_mut(0, 1).usages = 1;
        g.facts.ensure_mut(0, 2).usages = 3;

        optimize_set(&mut g, g.entry, ins);

        let dst = g.facts.get(0, 2);
        assert!(dst.has(FactFlags::KNOWN_VALUE));
        assert_eq!(dst.value, Some(KnownValue::I64(42)));
        assert_eq!(dst.usages, 3, "set doesn't remove itself; usages untouched");
        assert_eq!(g.facts.get(0, 1).usages, 1, "src usages untouched too");
    }

    #[test]
    fn propagates_known_type() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        let ty = TypeId(5);
        g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_TYPE;
        g.facts.get_mut(0, 1).ty = Some(ty);
        g.facts.ensure_mut(0, 2);

        optimize_set(&mut g, g.entry, ins);

        let dst = g.facts.get(0, 2);
        assert!(dst.has(FactFlags::KNOWN_TYPE));
        assert_eq!(dst.ty, Some(ty));
    }

    #[test]
    fn no_facts_on_src_leaves_dst_untouched() {
        let mut g = SpeshGraph::new();
        let ins = build(&mut g);
        g.facts.ensure_mut(0, 1);
        g.facts.ensure_mut(0, 2);

        optimize_set(&mut g, g.entry, ins);

        assert_eq!(g.facts.get(0, 2).flags, FactFlags::empty());
    }
}
