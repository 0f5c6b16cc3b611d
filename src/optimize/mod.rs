//! The optimization pass (`spec.md` §4, §4.9 "Driver").

pub mod bb_walk;
pub mod copy_prop;
pub mod dce;
pub mod decont;
pub mod iffy;
pub mod istype;
pub mod method_lookup;

use crate::config::OptConfig;
use crate::graph::SpeshGraph;
use crate::oracle::Oracles;

/// `MVM_spesh_optimize` (`spec.md` §6 "Public entry point", §4.9): runs the
/// dominator-tree walk (forward peephole + reverse DCE) over the whole
/// graph, then the unreachable-block sweep. Single-shot — no profitability
/// threshold, no pass ordering beyond these two steps, no error channel;
/// failures in the oracle are silent non-optimizations (`spec.md` §7).
pub fn optimize(graph: &mut SpeshGraph, cfg: &OptConfig, oracle: &dyn Oracles) {
    bb_walk::optimize_bb(graph, graph.entry, cfg, oracle);
    if cfg.eliminate_dead_blocks {
        dce::eliminate_dead(graph);
    }
}
