//! Unreachable-block elimination (`spec.md` §4.8).

use log::debug;

use crate::graph::SpeshGraph;

/// Splices blocks with no path back to `entry` out of the `linear_next`
/// chain, iterating to a fixed point, then renumbers the surviving blocks
/// densely.
///
/// Runs after the dominator-tree walk, not interleaved with it: removing a
/// successor edge is 4.6's job, this pass only reacts to edges that are
/// already gone. A block spliced out in one iteration still contributed
/// its own `succ` list to the `seen` bitmap *during that same iteration*
/// (it's only actually removed from `linear_next` in the removal pass that
/// follows), so a chain of newly-orphaned blocks is peeled off one layer
/// per iteration; the loop below runs until a full pass makes no changes,
/// guaranteeing the transitive closure is reached (`spec.md` §4.8
/// rationale).
pub fn eliminate_dead(g: &mut SpeshGraph) {
    let orig_bbs = g.num_bbs;
    let mut death = true;

    while death {
        death = false;

        // Pass 1: mark every block that is the entry or the successor of
        // some other (still-chained) block.
        let mut seen = vec![false; g.blocks.len()];
        seen[g.entry.0 as usize] = true;
        let mut cur = Some(g.entry);
        while let Some(bb) = cur {
            for &s in &g.block(bb).succ {
                seen[s.0 as usize] = true;
            }
            cur = g.block(bb).linear_next;
        }

        // Pass 2: splice out any unmarked block that's next in the chain.
        //
        // This walks `bb = bb.linear_next` unconditionally after each
        // check, even right after a splice — it does NOT loop back to
        // recheck the newly-adjacent block in the same pass. A block that
        // becomes unreachable only because its sole predecessor was just
        // spliced survives this iteration (it still contributed its
        // `succ` list to `seen` in pass 1, per the doc comment above) and
        // is caught by the next `while death` iteration instead. Matching
        // this exactly, rather than eagerly rechecking, keeps the
        // single-layer-per-iteration behavior `spec.md` §4.8 documents.
        let mut cur = Some(g.entry);
        while let Some(bb) = cur {
            let next = g.block(bb).linear_next;
            if let Some(n) = next {
                if !seen[n.0 as usize] {
                    let after = g.block(n).linear_next;
                    g.block_mut(bb).linear_next = after;
                    g.num_bbs -= 1;
                    death = true;
                    debug!("eliminate_dead: spliced out bb{}", n.0);
                }
            }
            cur = g.block(bb).linear_next;
        }
    }

    if g.num_bbs != orig_bbs {
        let mut new_idx = 0u32;
        let mut cur = Some(g.entry);
        while let Some(bb) = cur {
            g.block_mut(bb).idx = new_idx;
            new_idx += 1;
            cur = g.block(bb).linear_next;
        }
    }
}
