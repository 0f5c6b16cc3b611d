//! The spesh graph data model (`spec.md` §3).

mod block;
mod instr;
mod operand;
mod slots;

pub use block::BasicBlock;
pub use instr::Instruction;
pub use operand::Operand;
pub use slots::{SpeshSlots, SLOT_GROWTH_STEP};

use crate::arena::SpeshArena;
use crate::facts::FactTable;
use crate::opcode::{Opcode, OperandKind};

/// Index of a [`BasicBlock`] within [`SpeshGraph::blocks`]. Stable only
/// between reindex passes (`spec.md` §3, §4.8) — code that needs to
/// survive a call to [`crate::optimize::optimize`] must not cache one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BbId(pub u32);

/// Index of an [`Instruction`] within [`SpeshGraph::instructions`]. Stable
/// for the instruction's lifetime (instructions are never relocated, only
/// unlinked).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsId(pub u32);

/// Owns all blocks, instructions, and facts for one function/frame being
/// specialized (`spec.md` §3 "Graph"). One graph is optimized per call to
/// [`crate::optimize::optimize`]; `spec.md` §5 explicitly rules out
/// concurrent optimization of a single graph.
#[derive(Debug)]
pub struct SpeshGraph {
    pub entry: BbId,
    pub blocks: Vec<BasicBlock>,
    /// Dense count of *live* blocks — decremented as [`crate::optimize::dce::eliminate_dead`]
    /// splices dead blocks out of the `linear_next` chain; `blocks.len()` is
    /// the high-water mark and is never shrunk (blocks are arena-owned, not
    /// individually reclaimed, per `spec.md` §3 Lifecycles).
    pub num_bbs: u32,
    pub facts: FactTable,
    pub slots: SpeshSlots,
    pub arena: SpeshArena,
    /// Stand-in for `spec.md` §3's "reference to the containing code frame
    /// for string-constant lookup" — out of scope in full (frame/bytecode
    /// construction belongs to the external lowering pass), but the
    /// optimizer's own `get_string` helper (`spec.md` §4.2) needs somewhere
    /// to resolve a `lit_str_idx` operand to an actual name.
    pub strings: Vec<String>,
    instructions: Vec<Instruction>,
}

impl SpeshGraph {
    /// Builds an empty graph with a single entry block.
    pub fn new() -> Self {
        let entry_block = BasicBlock::new(0);
        SpeshGraph {
            entry: BbId(0),
            blocks: vec![entry_block],
            num_bbs: 1,
            facts: FactTable::new(),
            slots: SpeshSlots::new(),
            arena: SpeshArena::new(),
            strings: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Interns `s` into the graph's string table and returns its index,
    /// suitable for use in an [`Operand::LitStrIdx`].
    pub fn push_string(&mut self, s: impl Into<String>) -> u32 {
        self.strings.push(s.into());
        (self.strings.len() - 1) as u32
    }

    /// `get_string` (`spec.md` §4.2): resolves a `lit_str_idx` operand to
    /// its backing name.
    pub fn get_string(&self, idx: u32) -> &str {
        &self.strings[idx as usize]
    }

    pub fn block(&self, id: BbId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BbId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn ins(&self, id: InsId) -> &Instruction {
        &self.instructions[id.0 as usize]
    }

    pub fn ins_mut(&mut self, id: InsId) -> &mut Instruction {
        &mut self.instructions[id.0 as usize]
    }

    /// Appends a new basic block (not yet linked into `linear_next`,
    /// `succ`/`pred`, or any dominator-tree `children` list — callers wire
    /// that up themselves, e.g. via [`SpeshGraph::link_linear`] and
    /// [`SpeshGraph::add_edge`]).
    pub fn push_block(&mut self) -> BbId {
        let idx = self.blocks.len() as u32;
        self.blocks.push(BasicBlock::new(idx));
        self.num_bbs += 1;
        BbId(idx)
    }

    /// Sets `from.linear_next = Some(to)`.
    pub fn link_linear(&mut self, from: BbId, to: BbId) {
        self.block_mut(from).linear_next = Some(to);
    }

    /// Adds a control-flow edge `from -> to`, updating both endpoints'
    /// `succ`/`pred` lists.
    pub fn add_edge(&mut self, from: BbId, to: BbId) {
        self.block_mut(from).succ.push(to);
        self.block_mut(to).pred.push(from);
    }

    pub fn add_dom_child(&mut self, parent: BbId, child: BbId) {
        self.block_mut(parent).children.push(child);
    }

    /// Appends a new instruction to the end of `bb`'s intra-block list and
    /// returns its id.
    pub fn push_ins(&mut self, bb: BbId, opcode: Opcode, operands: Vec<Operand>) -> InsId {
        let id = InsId(self.instructions.len() as u32);
        let mut ins = Instruction::new(id, opcode, operands);

        let last = self.block(bb).last_ins;
        ins.prev = last;
        self.instructions.push(ins);

        if let Some(last) = last {
            self.ins_mut(last).next = Some(id);
        } else {
            self.block_mut(bb).first_ins = Some(id);
        }
        self.block_mut(bb).last_ins = Some(id);
        id
    }

    /// Walks every instruction across every live block and every operand
    /// position that descriptor-classifies as a register read, tallying
    /// occurrences of each `(orig, i)`. Used by tests and by
    /// `debug_assert_usages_consistent` to check the conservation
    /// invariant from `spec.md` §8 — not called on the hot optimization
    /// path.
    pub fn count_live_read_usages(&self) -> std::collections::HashMap<(u32, u32), u32> {
        let mut counts = std::collections::HashMap::new();
        let mut bb = Some(self.entry);
        while let Some(bb_id) = bb {
            let mut ins = self.block(bb_id).first_ins;
            while let Some(ins_id) = ins {
                let instr = self.ins(ins_id);
                for (_, kind, operand) in instr.operand_kinds() {
                    if kind.contains(OperandKind::READ_REG) {
                        if let Some((orig, i)) = operand.as_reg() {
                            *counts.entry((orig, i)).or_insert(0) += 1;
                        }
                    }
                }
                ins = instr.next;
            }
            bb = self.block(bb_id).linear_next;
        }
        counts
    }

    /// Panics if any live `(orig, i)` register's recorded `usages` fact
    /// disagrees with the actual number of read-register operands
    /// referencing it. This is `spec.md` §8's "Use-count conservation"
    /// property, checked eagerly rather than left to a property-testing
    /// harness — the donor crate's own passes (e.g. `cfg_simplify.rs`)
    /// favor small, direct structural assertions over generated inputs,
    /// and this crate follows suit.
    pub fn debug_assert_usages_consistent(&self) {
        let counts = self.count_live_read_usages();
        // Walk every populated fact slot, not just the ones `counts` has an
        // entry for — a register with zero surviving reads never appears
        // as a key in `counts`, so iterating `counts` alone would miss a
        // stale non-zero `usages` left on a register nothing reads anymore.
        for (orig, i, facts) in self.facts.entries() {
            let expected = counts.get(&(orig, i)).copied().unwrap_or(0);
            assert_eq!(
                facts.usages, expected,
                "usages({orig},{i}) = {}, but {expected} live reads remain",
                facts.usages
            );
        }
    }

    /// Length of the `linear_next` chain starting at `entry`, and densely
    /// checks that the visited `idx` values are exactly `0..len` in order
    /// (`spec.md` §8 "Graph connectivity"). Returns the chain length.
    pub fn linear_chain_len(&self) -> u32 {
        let mut count = 0u32;
        let mut bb = Some(self.entry);
        while let Some(bb_id) = bb {
            assert_eq!(
                self.block(bb_id).idx,
                count,
                "block idx out of order in linear_next chain"
            );
            count += 1;
            bb = self.block(bb_id).linear_next;
        }
        count
    }
}

impl Default for SpeshGraph {
    fn default() -> Self {
        Self::new()
    }
}
