//! Error taxonomy for the optimizer (see `spec.md` §7).
//!
//! Oracle-indeterminate outcomes are not errors — they are the ordinary
//! "leave the instruction untouched" path and never surface here. Only the
//! two fatal/programmer-error categories get a variant.

use thiserror::Error;

/// Errors the optimizer can report. Both are expected to be rare: a
/// well-formed graph coming out of the analysis pass should never trip
/// [`SpeshError::InvariantViolation`], and [`SpeshError::AllocatorExhausted`]
/// only fires if the host process is genuinely out of memory.
#[derive(Debug, Error)]
pub enum SpeshError {
    /// The bump arena or spesh-slot table could not grow. Fatal; callers
    /// should propagate this up through whatever owns the thread context.
    #[error("spesh arena exhausted: {0}")]
    AllocatorExhausted(String),

    /// A structural invariant the pass relies on does not hold, e.g. a
    /// `pure` instruction whose operand 0 is not a write-register. Treated
    /// as programmer error in the analysis pass or graph builder, not a
    /// recoverable condition.
    #[error("spesh graph invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SpeshError>;
