// src/exec/backend.rs

//! Pluggable tool-runner abstraction.
//!
//! Pipeline builders never spawn processes themselves; they hand a
//! [`ToolInvocation`] to a [`ToolRunner`] and then read the table it
//! produced through the `FileSystem`. Production uses
//! [`ProcessToolRunner`]; tests provide a fake that writes canned tables.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

use super::tool_runner::run_tool;

/// One invocation of an external table-producing tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the tool runs in; relative table names resolve here.
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cd {} && {}", self.cwd.display(), self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Trait abstracting how external tools are run.
pub trait ToolRunner: Send {
    /// Run the tool to completion. A non-zero exit must be reported as
    /// `WorkflowError::ToolFailed`.
    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs tools as child processes and waits for each one to exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner;

impl ProcessToolRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessToolRunner {
    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(run_tool(invocation))
    }
}
