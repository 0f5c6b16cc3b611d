//! Speculative-specialization graph optimizer.
//!
//! Rewrites a [`graph::SpeshGraph`] in place, exploiting facts discovered by
//! a prior (external) analysis phase to specialize polymorphic operations,
//! fold constants, prune control flow, and eliminate dead code. See
//! [`optimize::optimize`] for the single public entry point.
#![allow(clippy::too_many_arguments)]

pub mod arena;
pub mod config;
pub mod error;
pub mod facts;
pub mod graph;
pub mod manipulate;
pub mod opcode;
pub mod optimize;
pub mod oracle;

pub use config::OptConfig;
pub use error::{Result, SpeshError};
pub use graph::SpeshGraph;
pub use optimize::optimize;
pub use oracle::Oracles;
