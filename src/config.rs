//! Optimizer configuration.
//!
//! `spec.md` names no profitability threshold or pass-ordering knob
//! (§4.9: "single-shot; no profitability threshold"), so this struct is
//! strictly subtractive — it only gates which rewriters and sweeps run,
//! never reorders them. Shaped after the `OptConfig`/`Default` pair in
//! `pro-grammer-SD-axiom`'s bytecode optimizer (`axm/src/optimizer.rs`),
//! which gates its own pipeline the same way.

#[derive(Debug, Clone)]
pub struct OptConfig {
    /// `optimize_method_lookup` (`spec.md` §4.2).
    pub method_lookup: bool,
    /// `optimize_istype` (`spec.md` §4.3).
    pub istype: bool,
    /// `optimize_set` copy propagation (`spec.md` §4.4).
    pub copy_prop: bool,
    /// `optimize_decont` (`spec.md` §4.5).
    pub decont: bool,
    /// `optimize_iffy` conditional folding (`spec.md` §4.6).
    pub iffy: bool,
    /// Reverse-pass dead-store elimination within `optimize_bb` (`spec.md` §4.7).
    pub dead_store_elim: bool,
    /// `eliminate_dead` unreachable-block sweep (`spec.md` §4.8).
    pub eliminate_dead_blocks: bool,
}

impl Default for OptConfig {
    fn default() -> Self {
        OptConfig {
            method_lookup: true,
            istype: true,
            copy_prop: true,
            decont: true,
            iffy: true,
            dead_store_elim: true,
            eliminate_dead_blocks: true,
        }
    }
}
