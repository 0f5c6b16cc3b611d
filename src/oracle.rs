//! Black-box 6model oracles (`spec.md` §1, §6).
//!
//! The object model's method-cache and type-check primitives are
//! out-of-scope collaborators: side-effect-free, cache-only lookups that
//! either answer or decline to answer. Modeled as traits so tests and the
//! demo CLI can supply a fixture without a real VM behind them.

use std::collections::HashMap;

/// Opaque handle for a runtime type, as seen by the optimizer. The real
/// object model's type objects are out of scope; only identity matters
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Opaque handle for a resolved method, pinned into a spesh slot once
/// found (`spec.md` §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef(pub u32);

/// Tri-state result of a cache-only type check (`spec.md` §4.3): the
/// oracle either decides the answer from its cache or declines because
/// deciding would require side effects (e.g. invoking a custom
/// `HOW.type_check`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAnswer {
    Decided(bool),
    Indeterminate,
}

/// `MVM_6model_find_method_cache_only` (`spec.md` §6): must not trigger a
/// method-not-found fallback and must not raise.
pub trait MethodCacheOracle {
    fn find_method_cache_only(&self, ty: TypeId, name: &str) -> Option<MethodRef>;
}

/// `MVM_6model_try_cache_type_check` (`spec.md` §6), with the C `bool`
/// return + `&mut result` out-parameter replaced by a single tri-state
/// return value — the idiomatic Rust shape for the same contract.
pub trait TypeCheckOracle {
    fn try_cache_type_check(&self, obj_ty: TypeId, target_ty: TypeId) -> CacheAnswer;
}

/// Bundles both oracle traits behind one reference so [`crate::optimize::optimize`]
/// only needs a single parameter.
pub trait Oracles: MethodCacheOracle + TypeCheckOracle {}
impl<T: MethodCacheOracle + TypeCheckOracle> Oracles for T {}

/// A fixture oracle backed by plain hash maps, used by the demo CLI and by
/// this crate's own tests. Not part of the optimizer's public contract —
/// real embedders supply their own object-model-backed implementation.
#[derive(Debug, Default)]
pub struct MockOracle {
    methods: HashMap<(TypeId, String), MethodRef>,
    type_checks: HashMap<(TypeId, TypeId), CacheAnswer>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_method(&mut self, ty: TypeId, name: impl Into<String>, meth: MethodRef) {
        self.methods.insert((ty, name.into()), meth);
    }

    pub fn register_type_check(&mut self, obj_ty: TypeId, target_ty: TypeId, answer: CacheAnswer) {
        self.type_checks.insert((obj_ty, target_ty), answer);
    }
}

impl MethodCacheOracle for MockOracle {
    fn find_method_cache_only(&self, ty: TypeId, name: &str) -> Option<MethodRef> {
        self.methods.get(&(ty, name.to_string())).copied()
    }
}

impl TypeCheckOracle for MockOracle {
    fn try_cache_type_check(&self, obj_ty: TypeId, target_ty: TypeId) -> CacheAnswer {
        self.type_checks
            .get(&(obj_ty, target_ty))
            .copied()
            .unwrap_or(CacheAnswer::Indeterminate)
    }
}
