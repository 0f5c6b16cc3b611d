//! Demo driver for the spesh-style optimizer.
//!
//! Builds one of a handful of toy graphs matching `spec.md` §8's
//! end-to-end scenarios, runs [`spesh_opt::optimize`], and prints a
//! before/after summary. Modeled on the donor compiler's hand-rolled
//! `main.rs` argument loop rather than pulling in a CLI-parsing crate —
//! the surface here is a handful of flags, not worth the dependency.

use spesh_opt::facts::{FactFlags, KnownValue};
use spesh_opt::graph::{Operand, SpeshGraph};
use spesh_opt::oracle::{MethodRef, MockOracle, TypeId};
use spesh_opt::opcode::Opcode;
use spesh_opt::{optimize, OptConfig};

fn main() {
    env_logger::init();

    let mut scenario = 1u32;
    let mut verbose = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => verbose = true,
            "--scenario" => {
                i += 1;
                match args.get(i).and_then(|s| s.parse().ok()) {
                    Some(n) => scenario = n,
                    None => {
                        eprintln!("error: --scenario requires a numeric argument");
                        std::process::exit(1);
                    }
                }
            }
            "-h" | "--help" => {
                print_usage();
                return;
            }
            arg => {
                eprintln!("warning: unknown flag: {arg}");
            }
        }
        i += 1;
    }

    let (mut graph, oracle) = build_scenario(scenario);

    if verbose {
        println!("=== before ===");
        print_graph(&graph);
    }

    let cfg = OptConfig::default();
    optimize(&mut graph, &cfg, &oracle);

    println!("=== after (scenario {scenario}) ===");
    print_graph(&graph);
}

fn print_usage() {
    println!("usage: spesh-opt [-v|--verbose] [--scenario N]");
    println!();
    println!("scenarios:");
    println!("  1  monomorphic method lookup (findmeth resolves)");
    println!("  2  polymorphic method lookup (findmeth stays polymorphic)");
    println!("  3  constant-folded conditional (never-taken if_i)");
    println!("  4  always-taken unless_i -> goto");
    println!("  5  dead pure instruction removed by reverse-pass DCE");
    println!("  6  unreachable block spliced out by eliminate_dead");
}

fn print_graph(g: &SpeshGraph) {
    let mut bb = Some(g.entry);
    while let Some(bb_id) = bb {
        let block = g.block(bb_id);
        println!("bb{} (succ: {:?})", block.idx, block.succ.iter().map(|b| b.0).collect::<Vec<_>>());
        let mut ins = block.first_ins;
        while let Some(ins_id) = ins {
            let instr = g.ins(ins_id);
            println!("    {:?} {:?}", instr.opcode, instr.operands);
            ins = instr.next;
        }
        bb = block.linear_next;
    }
    println!("num_bbs: {}, slots: {}", g.num_bbs, g.slots.len());
}

fn build_scenario(n: u32) -> (SpeshGraph, MockOracle) {
    match n {
        1 => scenario_monomorphic_findmeth(),
        2 => scenario_polymorphic_findmeth(),
        3 => scenario_never_taken_if(),
        4 => scenario_always_taken_unless(),
        5 => scenario_dead_pure_instruction(),
        6 => scenario_unreachable_block(),
        other => {
            eprintln!("error: unknown scenario {other} (expected 1-6)");
            std::process::exit(1);
        }
    }
}

/// Scenario 1 (`spec.md` §8): `findmeth r2, r1, "size"` where `r1`'s type
/// is known and the oracle resolves `size`.
fn scenario_monomorphic_findmeth() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    let name_idx = g.push_string("size");
    let ty = TypeId(1);
    g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_TYPE;
    g.facts.get_mut(0, 1).ty = Some(ty);
    g.facts.get_mut(0, 1).usages = 1;
    g.facts.ensure_mut(0, 2);

    g.push_ins(
        g.entry,
        Opcode::Findmeth,
        vec![Operand::reg(0, 2), Operand::reg(0, 1), Operand::LitStrIdx(name_idx)],
    );

    let mut oracle = MockOracle::new();
    oracle.register_method(ty, "size", MethodRef(9));
    (g, oracle)
}

/// Scenario 2: same shape, but the oracle has nothing for `size`, so the
/// instruction stays polymorphic with a reserved two-slot cache pair.
fn scenario_polymorphic_findmeth() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    let name_idx = g.push_string("size");
    let ty = TypeId(1);
    g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_TYPE;
    g.facts.get_mut(0, 1).ty = Some(ty);
    g.facts.get_mut(0, 1).usages = 1;
    g.facts.ensure_mut(0, 2);

    g.push_ins(
        g.entry,
        Opcode::Findmeth,
        vec![Operand::reg(0, 2), Operand::reg(0, 1), Operand::LitStrIdx(name_idx)],
    );

    (g, MockOracle::new())
}

/// Scenario 3: `if_i r1, bb1` with `r1` known false — the branch is never
/// taken, so the instruction is deleted and `bb1` drops out of `succ`.
fn scenario_never_taken_if() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    let target = g.push_block();
    g.link_linear(g.entry, target);
    g.add_edge(g.entry, target);
    g.add_dom_child(g.entry, target);

    g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_VALUE;
    g.facts.get_mut(0, 1).value = Some(KnownValue::I64(0));
    g.facts.get_mut(0, 1).usages = 1;

    g.push_ins(g.entry, Opcode::IfI, vec![Operand::reg(0, 1), Operand::InsBb(target)]);

    (g, MockOracle::new())
}

/// Scenario 4: `unless_i r1, bb1` with `r1` known false — `unless` negates
/// the sense, so the branch is always taken and folds to `goto bb1`.
fn scenario_always_taken_unless() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    let target = g.push_block();
    let fall_through = g.push_block();
    g.link_linear(g.entry, fall_through);
    g.link_linear(fall_through, target);
    g.add_edge(g.entry, target);
    g.add_edge(g.entry, fall_through);
    g.add_dom_child(g.entry, target);
    g.add_dom_child(g.entry, fall_through);

    g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_VALUE;
    g.facts.get_mut(0, 1).value = Some(KnownValue::I64(0));
    g.facts.get_mut(0, 1).usages = 1;

    g.push_ins(g.entry, Opcode::UnlessI, vec![Operand::reg(0, 1), Operand::InsBb(target)]);

    (g, MockOracle::new())
}

/// Scenario 5: `add_i r5, r3, r4` is pure and `r5` has no remaining reads —
/// the reverse pass should remove it and decrement `r3`/`r4`'s usages.
fn scenario_dead_pure_instruction() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    g.facts.ensure_mut(0, 3).usages = 1;
    g.facts.ensure_mut(0, 4).usages = 1;
    g.facts.ensure_mut(0, 5).usages = 0;

    g.push_ins(
        g.entry,
        Opcode::AddI,
        vec![Operand::reg(0, 5), Operand::reg(0, 3), Operand::reg(0, 4)],
    );

    (g, MockOracle::new())
}

/// Scenario 6: `bb2` has no predecessor once the entry's only edge to it
/// (via `bb1`) is removed by a never-taken `if_i` — `eliminate_dead`
/// should splice `bb2` out of `linear_next` entirely.
fn scenario_unreachable_block() -> (SpeshGraph, MockOracle) {
    let mut g = SpeshGraph::new();
    let bb1 = g.push_block();
    let bb2 = g.push_block();
    g.link_linear(g.entry, bb1);
    g.link_linear(bb1, bb2);
    g.add_edge(g.entry, bb2);
    g.add_dom_child(g.entry, bb1);
    g.add_dom_child(g.entry, bb2);

    g.facts.ensure_mut(0, 1).flags = FactFlags::KNOWN_VALUE;
    g.facts.get_mut(0, 1).value = Some(KnownValue::I64(0));
    g.facts.get_mut(0, 1).usages = 1;

    // Only edge into bb2 is this never-taken branch; once it folds away,
    // bb2 has no surviving predecessor.
    g.push_ins(g.entry, Opcode::IfI, vec![Operand::reg(0, 1), Operand::InsBb(bb2)]);

    (g, MockOracle::new())
}
