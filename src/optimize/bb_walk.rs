//! Dominator-tree walk with dead-store elimination (`spec.md` §4.7).

use log::trace;

use crate::config::OptConfig;
use crate::graph::{BbId, SpeshGraph};
use crate::manipulate::delete_ins;
use crate::opcode::{Opcode, OperandKind};
use crate::oracle::Oracles;

use super::copy_prop::optimize_set;
use super::decont::optimize_decont;
use super::iffy::optimize_iffy;
use super::istype::optimize_istype;
use super::method_lookup::optimize_method_lookup;

/// Visits `bb` and its dominator-tree descendants, recursively. Runs a
/// forward peephole pass over `bb`'s instructions, recurses into each
/// dominator-tree child (order not observable — rewriters never depend on
/// sibling results), then runs a reverse dead-store-elimination pass over
/// `bb`.
///
/// The forward/recurse/reverse shape is essential: the forward pass may
/// create new known-value facts that make downstream uses redundant; the
/// reverse pass, run only after every dominated descendant has completed
/// both of its own passes, removes now-dead producers with correct use
/// counts (`spec.md` §4.7, §5 "Ordering guarantees").
pub fn optimize_bb(g: &mut SpeshGraph, bb: BbId, cfg: &OptConfig, oracle: &dyn Oracles) {
    forward_pass(g, bb, cfg, oracle);

    let children = g.block(bb).children.clone();
    for child in children {
        optimize_bb(g, child, cfg, oracle);
    }

    if cfg.dead_store_elim {
        reverse_pass(g, bb);
    }
}

fn forward_pass(g: &mut SpeshGraph, bb: BbId, cfg: &OptConfig, oracle: &dyn Oracles) {
    // Snapshot the chain start; each rewriter may delete or retarget the
    // current instruction, so `next` is cached before dispatch rather than
    // read off a possibly-unlinked node afterward (spec.md §4.7 step 1,
    // §9 "Iterator invalidation during mutation").
    let mut cur = g.block(bb).first_ins;
    while let Some(ins_id) = cur {
        let next = g.ins(ins_id).next;
        match g.ins(ins_id).opcode {
            Opcode::Findmeth if cfg.method_lookup => {
                optimize_method_lookup(g, bb, ins_id, oracle);
            }
            Opcode::Decont if cfg.decont => {
                optimize_decont(g, bb, ins_id);
            }
            Opcode::Istype if cfg.istype => {
                optimize_istype(g, bb, ins_id, oracle);
            }
            Opcode::Set if cfg.copy_prop => {
                optimize_set(g, bb, ins_id);
            }
            Opcode::IfI | Opcode::UnlessI if cfg.iffy => {
                optimize_iffy(g, bb, ins_id);
            }
            _ => {}
        }
        cur = next;
    }
}

fn reverse_pass(g: &mut SpeshGraph, bb: BbId) {
    let mut cur = g.block(bb).last_ins;
    while let Some(ins_id) = cur {
        let prev = g.ins(ins_id).prev;
        let opcode = g.ins(ins_id).opcode;

        if opcode == Opcode::SsaPhi {
            let (dst_orig, dst_i) = g.ins(ins_id).operands[0]
                .as_reg()
                .expect("SSA_PHI operand 0 is dst");
            if g.facts.get(dst_orig, dst_i).usages == 0 {
                // Propagate non-usage: every operand from index 1 onward
                // is treated as a read regardless of its descriptor.
                let reads: Vec<(u32, u32)> = g.ins(ins_id).operands[1..]
                    .iter()
                    .filter_map(|op| op.as_reg())
                    .collect();
                for (orig, i) in reads {
                    g.facts.dec_usage(orig, i);
                }
                delete_ins(g, bb, ins_id);
                trace!("reverse_pass: dropped dead SSA_PHI");
            }
        } else if g.ins(ins_id).is_pure() {
            let op0 = g.ins(ins_id).operands[0];
            let op0_kind = g.ins(ins_id).opcode_info().operand_kinds.first().copied();
            if op0_kind == Some(OperandKind::WRITE_REG) {
                if let Some((dst_orig, dst_i)) = op0.as_reg() {
                    if g.facts.get(dst_orig, dst_i).usages == 0 {
                        let reads: Vec<(u32, u32)> = g
                            .ins(ins_id)
                            .operand_kinds()
                            .filter(|(_, kind, _)| kind.contains(OperandKind::READ_REG))
                            .filter_map(|(_, _, op)| op.as_reg())
                            .collect();
                        for (orig, i) in reads {
                            g.facts.dec_usage(orig, i);
                        }
                        delete_ins(g, bb, ins_id);
                        trace!("reverse_pass: dropped dead pure instruction");
                    }
                }
            }
        }

        cur = prev;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Operand;
    use crate::oracle::MockOracle;

    /// Scenario 5 (spec.md §8): a pure instruction whose result has no
    /// remaining reads is removed by the reverse pass, and its own reads
    /// are decremented in turn.
    #[test]
    fn reverse_pass_removes_dead_pure_instruction() {
        let mut g = SpeshGraph::new();
        g.facts.ensure_mut(0, 3).usages = 1;
        g.facts.ensure_mut(0, 4).usages = 1;
        g.facts.ensure_mut(0, 5).usages = 0;
        g.push_ins(
            g.entry,
            Opcode::AddI,
            vec![Operand::reg(0, 5), Operand::reg(0, 3), Operand::reg(0, 4)],
        );

        let cfg = OptConfig::default();
        let oracle = MockOracle::new();
        optimize_bb(&mut g, g.entry, &cfg, &oracle);

        assert!(g.block(g.entry).first_ins.is_none());
        assert_eq!(g.facts.get(0, 3).usages, 0);
        assert_eq!(g.facts.get(0, 4).usages, 0);
    }

    #[test]
    fn live_pure_instruction_survives() {
        let mut g = SpeshGraph::new();
        g.facts.ensure_mut(0, 3).usages = 1;
        g.facts.ensure_mut(0, 4).usages = 1;
        g.facts.ensure_mut(0, 5).usages = 1;
        let ins = g.push_ins(
            g.entry,
            Opcode::AddI,
            vec![Operand::reg(0, 5), Operand::reg(0, 3), Operand::reg(0, 4)],
        );

        let cfg = OptConfig::default();
        let oracle = MockOracle::new();
        optimize_bb(&mut g, g.entry, &cfg, &oracle);

        assert_eq!(g.block(g.entry).first_ins, Some(ins));
        assert_eq!(g.facts.get(0, 3).usages, 1);
    }

    /// A dead `SSA_PHI` is removed and every operand from index 1 onward
    /// is treated as a read, regardless of its descriptor (spec.md §4.7).
    #[test]
    fn reverse_pass_removes_dead_ssa_phi() {
        let mut g = SpeshGraph::new();
        g.facts.ensure_mut(0, 1).usages = 1;
        g.facts.ensure_mut(0, 2).usages = 1;
        g.facts.ensure_mut(0, 9).usages = 0;
        g.push_ins(
            g.entry,
            Opcode::SsaPhi,
            vec![Operand::reg(0, 9), Operand::reg(0, 1), Operand::reg(0, 2)],
        );

        let cfg = OptConfig::default();
        let oracle = MockOracle::new();
        optimize_bb(&mut g, g.entry, &cfg, &oracle);

        assert!(g.block(g.entry).first_ins.is_none());
        assert_eq!(g.facts.get(0, 1).usages, 0);
        assert_eq!(g.facts.get(0, 2).usages, 0);
    }

    /// A producer in a parent block whose only consumer lives in a
    /// dominated child is reclaimed only after the child's reverse pass
    /// has run and decremented the producer's `usages` to zero — the
    /// "single sweep, not fixed point" behavior from spec.md §4.7.
    #[test]
    fn dead_store_reclaimed_after_dominated_child_runs() {
        let mut g = SpeshGraph::new();
        let child = g.push_block();
        g.link_linear(g.entry, child);
        g.add_edge(g.entry, child);
        g.add_dom_child(g.entry, child);

        // r5 = add_i r3, r4 in the entry block; only consumer is the `set`
        // in `child`, so r5's usages starts at 1.
        g.facts.ensure_mut(0, 3).usages = 1;
        g.facts.ensure_mut(0, 4).usages = 1;
        g.facts.ensure_mut(0, 5).usages = 1;
        g.push_ins(
            g.entry,
            Opcode::AddI,
            vec![Operand::reg(0, 5), Operand::reg(0, 3), Operand::reg(0, 4)],
        );

        g.facts.ensure_mut(0, 6).usages = 0;
        g.push_ins(child, Opcode::Set, vec![Operand::reg(0, 6), Operand::reg(0, 5)]);

        let cfg = OptConfig::default();
        let oracle = MockOracle::new();
        optimize_bb(&mut g, g.entry, &cfg, &oracle);

        // The set in `child` is itself dead (r6 unused), so its reverse
        // pass decrements r5's usages to 0; the entry's own reverse pass
        // (which runs after the child's, per the recursion order above)
        // then reclaims the producer.
        assert!(g.block(child).first_ins.is_none());
        assert!(g.block(g.entry).first_ins.is_none());
        assert_eq!(g.facts.get(0, 3).usages, 0);
        assert_eq!(g.facts.get(0, 4).usages, 0);
    }
}
