// src/engine/mod.rs

//! Top-level orchestration.
//!
//! [`WorkflowAssembler`] owns the filesystem, the tool runner and the
//! configuration for one run, and hands a `GenerationContext` to the
//! pipeline builders in a fixed order.

pub mod assembler;

pub use assembler::{AssembledWorkflow, WorkflowAssembler};
