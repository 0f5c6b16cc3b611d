//! Conditional folding (`spec.md` §4.6).

use log::trace;

use crate::facts::{FactFlags, KnownValue};
use crate::graph::{BbId, InsId, Operand, SpeshGraph};
use crate::manipulate::{delete_ins, remove_successor};
use crate::opcode::Opcode;

/// `if_i`/`unless_i flag, target` folds to an unconditional `goto` or is
/// deleted entirely when `flag` has a `KNOWN_VALUE`. The non-integer
/// `if`/`unless` family (`if_s`, `if_o`, `if_n`, and their `unless_*`
/// counterparts) is recognized but intentionally left alone — `spec.md`
/// §9 Open Question (a) resolves the ambiguous C fallthrough as a clean
/// early return, which is exactly what this match arm's absence gives us:
/// there is no `truthvalue` to read for those opcodes in the first place.
pub fn optimize_iffy(g: &mut SpeshGraph, bb: BbId, ins_id: InsId) {
    let opcode = g.ins(ins_id).opcode;
    let negated = match opcode {
        Opcode::IfI => false,
        Opcode::UnlessI => true,
        Opcode::IfS | Opcode::IfN | Opcode::IfO | Opcode::UnlessS | Opcode::UnlessN | Opcode::UnlessO => {
            return;
        }
        _ => return,
    };

    let (flag_orig, flag_i) = g.ins(ins_id).operands[0]
        .as_reg()
        .expect("iffy operand 0 is flag");
    let flag_facts = g.facts.get(flag_orig, flag_i);
    if !flag_facts.has(FactFlags::KNOWN_VALUE) {
        return;
    }
    let truth = match flag_facts.value {
        Some(KnownValue::I64(v)) => v != 0,
        None => return,
    };

    let target = g.ins(ins_id).operands[1].as_bb().expect("iffy operand 1 is target");

    if truth != negated {
        // Always taken: becomes an unconditional jump, and the
        // fall-through (linear_next) successor is no longer reachable
        // from this block via this instruction.
        let fall_through = g.block(bb).linear_next;
        g.ins_mut(ins_id).opcode = Opcode::Goto;
        g.ins_mut(ins_id).operands = vec![Operand::InsBb(target)];
        if let Some(ft) = fall_through {
            remove_successor(g, bb, ft);
        }
        trace!("optimize_iffy: always-taken -> goto bb{}", target.0);
    } else {
        // Never taken: drop entirely. Unlike the reverse-pass DCE helper,
        // this rewriter is the one deciding the flag read goes away, so it
        // owns the usages decrement per the delete_ins contract (spec.md
        // §4.6, §6: the utility itself never touches usages).
        remove_successor(g, bb, target);
        g.facts.dec_usage(flag_orig, flag_i);
        delete_ins(g, bb, ins_id);
        trace!("optimize_iffy: never-taken, instruction dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::KnownValue;

    fn build(g: &mut SpeshGraph, opcode: Opcode, target: BbId) -> InsId {
        g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_VALUE;
        g.facts.get_mut(0, 1).usages = 1;
        g.push_ins(g.entry, opcode, vec![Operand::reg(0, 1), Operand::InsBb(target)])
    }

    /// Scenario 3 (spec.md §8): never-taken `if_i` is deleted, its
    /// successor edge removed, fall-through kept.
    #[test]
    fn never_taken_if_i_is_deleted() {
        let mut g = SpeshGraph::new();
        let target = g.push_block();
        let fall_through = g.push_block();
        g.link_linear(g.entry, fall_through);
        g.add_edge(g.entry, target);
        g.add_edge(g.entry, fall_through);

        let ins = build(&mut g, Opcode::IfI, target);
        g.facts.get_mut(0, 1).value = Some(KnownValue::I64(0));

        optimize_iffy(&mut g, g.entry, ins);

        assert_eq!(g.block(g.entry).succ, vec![fall_through]);
        assert_eq!(g.facts.get(0, 1).usages, 0);
        assert!(g.block(g.entry).first_ins.is_none());
    }

    /// Scenario 4: always-taken `unless_i` folds to `goto`, drops the
    /// fall-through successor, keeps the target.
    #[test]
    fn always_taken_unless_i_becomes_goto() {
        let mut g = SpeshGraph::new();
        let target = g.push_block();
        let fall_through = g.push_block();
        g.link_linear(g.entry, fall_through);
        g.add_edge(g.entry, target);
        g.add_edge(g.entry, fall_through);

        let ins = build(&mut g, Opcode::UnlessI, target);
        g.facts.get_mut(0, 1).value = Some(KnownValue::I64(0));

        optimize_iffy(&mut g, g.entry, ins);

        assert_eq!(g.ins(ins).opcode, Opcode::Goto);
        assert_eq!(g.ins(ins).operands, vec![Operand::InsBb(target)]);
        assert_eq!(g.block(g.entry).succ, vec![target]);
        // The flag operand is discarded, not decremented, on the
        // always-taken path — matching `original_source/optimize.c`'s
        // `optimize_iffy`, which overwrites operand 0 without touching
        // `usages` here either.
        assert_eq!(g.facts.get(0, 1).usages, 1);
    }

    /// `if_s` (non-integer family) is recognized but left completely
    /// alone — `spec.md` §9 Open Question (a).
    #[test]
    fn non_integer_iffy_is_ignored() {
        let mut g = SpeshGraph::new();
        let target = g.push_block();
        g.add_edge(g.entry, target);
        let ins = build(&mut g, Opcode::IfS, target);
        g.facts.get_mut(0, 1).value = Some(KnownValue::I64(1));

        optimize_iffy(&mut g, g.entry, ins);

        assert_eq!(g.ins(ins).opcode, Opcode::IfS);
        assert_eq!(g.block(g.entry).succ, vec![target]);
    }

    /// Indeterminate flag (no KNOWN_VALUE) leaves the instruction alone.
    #[test]
    fn unknown_flag_is_left_untouched() {
        let mut g = SpeshGraph::new();
        let target = g.push_block();
        g.add_edge(g.entry, target);
        g.facts.ensure_mut(0, 1).usages = 1;
        let ins = g.push_ins(g.entry, Opcode::IfI, vec![Operand::reg(0, 1), Operand::InsBb(target)]);

        optimize_iffy(&mut g, g.entry, ins);

        assert_eq!(g.ins(ins).opcode, Opcode::IfI);
        assert_eq!(g.facts.get(0, 1).usages, 1);
    }
}
