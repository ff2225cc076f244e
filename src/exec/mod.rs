// src/exec/mod.rs

//! External tool execution layer.
//!
//! Discovery and tabulation tools (`mArchiveList`, `mDAGTbls`, `mOverlaps`)
//! must finish before the generator can read their tables, so every tool is
//! awaited to completion before the next step runs.
//!
//! - [`backend`] provides the `ToolRunner` trait and the production
//!   `ProcessToolRunner`, which tests replace with a fake.
//! - [`tool_runner`] spawns a single tool process with `tokio::process`.

pub mod backend;
pub mod tool_runner;

pub use backend::{ProcessToolRunner, ToolInvocation, ToolRunner};
pub use tool_runner::run_tool;
