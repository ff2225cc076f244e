// src/pipeline/context.rs

//! State shared by the pipeline builders while one workflow is assembled.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ReplicaCatalog;
use crate::config::ConfigFile;
use crate::dag::{File, Job, Workflow};
use crate::errors::Result;
use crate::exec::{ToolInvocation, ToolRunner};
use crate::fs::FileSystem;
use crate::table::Table;

/// Everything a builder may read or extend.
///
/// Owned by the assembler and lent out as `&mut` to one builder at a time;
/// the workflow and the replica catalog only ever grow.
pub struct GenerationContext {
    pub fs: Arc<dyn FileSystem>,
    pub runner: Box<dyn ToolRunner>,
    pub config: ConfigFile,
    /// Absolute path of the data directory; tools run here and every local
    /// replica points here.
    pub data_dir: PathBuf,
    pub workflow: Workflow,
    pub replicas: ReplicaCatalog,
}

impl GenerationContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Box<dyn ToolRunner>,
        config: ConfigFile,
        data_dir: PathBuf,
    ) -> Self {
        let workflow = Workflow::new(config.output.workflow_name.clone());
        Self {
            fs,
            runner,
            config,
            data_dir,
            workflow,
            replicas: ReplicaCatalog::new(),
        }
    }

    /// Where a file lives in the data directory.
    pub fn data_path(&self, file: &File) -> PathBuf {
        self.data_dir.join(file.lfn())
    }

    /// Register a file in the data directory at the `local` site.
    pub fn register_local(&mut self, file: &File) {
        let path = self.data_path(file);
        self.replicas.add_local(file.lfn(), &path);
    }

    /// An invocation of `program` running in the data directory.
    pub fn tool(&self, program: &str) -> ToolInvocation {
        ToolInvocation::new(program, self.data_dir.clone())
    }

    pub async fn run_tool(&mut self, invocation: ToolInvocation) -> Result<()> {
        self.runner.run(invocation).await
    }

    pub fn read_table(&self, file: &File) -> Result<Table> {
        Table::read(self.fs.as_ref(), &self.data_path(file))
    }

    pub fn write_table(&self, file: &File, table: &Table) -> Result<()> {
        table.write(self.fs.as_ref(), &self.data_path(file))
    }

    pub fn add_job(&mut self, job: Job) -> String {
        self.workflow.add_job(job)
    }
}
