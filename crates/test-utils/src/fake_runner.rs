use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use montage_workflow::errors::{Result, WorkflowError};
use montage_workflow::exec::{ToolInvocation, ToolRunner};
use montage_workflow::fs::FileSystem;
use montage_workflow::fs::mock::MockFileSystem;

/// Shared record of every invocation a [`FakeToolRunner`] received.
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    inner: Arc<Mutex<Vec<ToolInvocation>>>,
}

impl InvocationLog {
    pub fn all(&self) -> Vec<ToolInvocation> {
        self.inner.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.program.clone())
            .collect()
    }

    pub fn find(&self, program: &str) -> Vec<ToolInvocation> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.program == program)
            .cloned()
            .collect()
    }

    fn push(&self, invocation: ToolInvocation) {
        self.inner.lock().unwrap().push(invocation);
    }
}

/// A fake tool runner that:
/// - records every invocation
/// - writes canned tables into the mock filesystem, relative to the
///   invocation's working directory, when the configured program runs with
///   the table name among its arguments
/// - fails with a configured exit code for selected programs.
#[derive(Debug, Clone)]
pub struct FakeToolRunner {
    fs: MockFileSystem,
    outputs: HashMap<String, Vec<(String, String)>>,
    failures: HashMap<String, i32>,
    log: InvocationLog,
}

impl FakeToolRunner {
    pub fn new(fs: MockFileSystem) -> Self {
        Self {
            fs,
            outputs: HashMap::new(),
            failures: HashMap::new(),
            log: InvocationLog::default(),
        }
    }

    /// When `program` runs with `file_name` as an argument, write `text` to
    /// `<cwd>/<file_name>`.
    pub fn with_output(mut self, program: &str, file_name: &str, text: impl Into<String>) -> Self {
        self.outputs
            .entry(program.to_string())
            .or_default()
            .push((file_name.to_string(), text.into()));
        self
    }

    /// Make every run of `program` exit with `code`.
    pub fn failing(mut self, program: &str, code: i32) -> Self {
        self.failures.insert(program.to_string(), code);
        self
    }

    /// Handle to the invocation record; stays valid after the runner is
    /// boxed and moved into the assembler.
    pub fn log(&self) -> InvocationLog {
        self.log.clone()
    }

    fn handle(&self, invocation: &ToolInvocation) -> Result<()> {
        if let Some(&code) = self.failures.get(&invocation.program) {
            return Err(WorkflowError::ToolFailed {
                tool: invocation.program.clone(),
                code,
            });
        }

        if let Some(outputs) = self.outputs.get(&invocation.program) {
            for (file_name, text) in outputs {
                if invocation.args.iter().any(|a| a == file_name) {
                    self.fs
                        .write(&invocation.cwd.join(file_name), text.as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

impl ToolRunner for FakeToolRunner {
    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let result = self.handle(&invocation);
        self.log.push(invocation);
        Box::pin(async move { result })
    }
}
