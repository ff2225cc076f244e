// src/dag/mod.rs

//! Abstract workflow representation.
//!
//! - [`job`] holds jobs and the files they declare.
//! - [`workflow`] is the ordered job list with id assignment.
//! - [`graph`] infers job ordering from shared files and validates it.
//! - [`document`] renders everything as Pegasus YAML.

pub mod document;
pub mod graph;
pub mod job;
pub mod workflow;

pub use graph::{infer_dependencies, Dependency};
pub use job::{File, Job, Link, Use};
pub use workflow::Workflow;
