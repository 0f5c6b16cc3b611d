//! Graph utilities consumed by the rewriters (`spec.md` §6 "Consumed from
//! graph utilities").

use log::trace;

use crate::graph::{BbId, InsId, SpeshGraph};
use crate::oracle::MethodRef;

/// Appends `value` into the graph's spesh-slot table and returns the
/// pre-increment index (`spec.md` §4.1). `spec.md` elevates this to a
/// numbered component of THE CORE rather than an out-of-scope
/// collaborator, since the slot table itself lives on the graph.
pub fn add_spesh_slot(g: &mut SpeshGraph, value: Option<MethodRef>) -> u16 {
    let idx = g.slots.push(value);
    trace!("add_spesh_slot -> {idx}");
    idx
}

/// Removes the control-flow edge `bb -> successor`, updating both
/// endpoints' `succ`/`pred` lists and counts reciprocally (`spec.md` §6).
///
/// No-op if the edge does not exist (a rewriter that already removed it,
/// e.g. via an earlier call in the same instruction's handling, should not
/// need to guard against calling this twice — though in practice every
/// caller in this crate removes each edge exactly once).
pub fn remove_successor(g: &mut SpeshGraph, bb: BbId, successor: BbId) {
    if let Some(pos) = g.block(bb).succ.iter().position(|&s| s == successor) {
        g.block_mut(bb).succ.remove(pos);
    }
    if let Some(pos) = g.block(successor).pred.iter().position(|&p| p == bb) {
        g.block_mut(successor).pred.remove(pos);
    }
    trace!("remove_successor: bb{} -> bb{}", bb.0, successor.0);
}

/// Unlinks `ins` from `bb`'s intra-block doubly-linked list and updates
/// `first_ins`/`last_ins` as needed. Does **not** decrement any register's
/// `usages` — per `spec.md` §6, the caller must already have done so for
/// every read-register operand the instruction held, if removal is meant
/// to reflect those reads going away.
pub fn delete_ins(g: &mut SpeshGraph, bb: BbId, ins: InsId) {
    let (prev, next) = {
        let instr = g.ins(ins);
        (instr.prev, instr.next)
    };

    match prev {
        Some(p) => g.ins_mut(p).next = next,
        None => g.block_mut(bb).first_ins = next,
    }
    match next {
        Some(n) => g.ins_mut(n).prev = prev,
        None => g.block_mut(bb).last_ins = prev,
    }
    trace!("delete_ins: bb{} ins{}", bb.0, ins.0);
}
