#![allow(dead_code)]

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use montage_workflow::config::ConfigFile;
use montage_workflow::dag::Job;
use montage_workflow::engine::{AssembledWorkflow, WorkflowAssembler};
use montage_workflow::errors::Result;
use montage_workflow::fs::mock::MockFileSystem;
use montage_workflow::pipeline::MosaicRequest;
use montage_workflow::table::Table;
use montage_workflow::types::CatalogMode;

pub use montage_workflow_test_utils::builders::{install_montage, BandFixture, ConfigFileBuilder};
pub use montage_workflow_test_utils::fake_runner::{FakeToolRunner, InvocationLog};
pub use montage_workflow_test_utils::init_tracing;

pub const WORK_DIR: &str = "/work";
pub const DATA_DIR: &str = "/work/data";
pub const BIN_DIR: &str = "/opt/montage/bin";

/// A mock work directory with a fake Montage install and canned tool output.
pub struct Scenario {
    pub fs: MockFileSystem,
    pub runner: FakeToolRunner,
    pub config: ConfigFile,
    pub search_path: Option<OsString>,
    pub mode: Option<CatalogMode>,
}

/// What a run left behind.
pub struct Outcome {
    pub result: Result<AssembledWorkflow>,
    pub fs: MockFileSystem,
    pub log: InvocationLog,
}

impl Scenario {
    pub fn new() -> Self {
        init_tracing();
        let fs = MockFileSystem::new();
        fs.add_dir(WORK_DIR);
        let search_path = install_montage(&fs, BIN_DIR);
        let runner = FakeToolRunner::new(fs.clone());
        Self {
            fs,
            runner,
            config: ConfigFile::default(),
            search_path: Some(search_path),
            mode: None,
        }
    }

    pub fn with_band(mut self, fixture: &BandFixture) -> Self {
        self.runner = fixture.install(self.runner);
        self
    }

    pub fn with_config(mut self, config: ConfigFile) -> Self {
        self.config = config;
        self
    }

    pub fn with_mode(mut self, mode: CatalogMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_runner(mut self, f: impl FnOnce(FakeToolRunner) -> FakeToolRunner) -> Self {
        self.runner = f(self.runner);
        self
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub async fn run(self, center: &str, degrees: f64, bands: &[&str]) -> Outcome {
        let log = self.runner.log();
        let request = MosaicRequest::new(center, degrees, bands).expect("valid request");

        let mut assembler = WorkflowAssembler::new(
            Arc::new(self.fs.clone()),
            Box::new(self.runner),
            self.config,
            WORK_DIR,
        )
        .with_search_path(self.search_path);
        if let Some(mode) = self.mode {
            assembler = assembler.with_mode(mode);
        }

        let result = assembler.assemble(&request).await;
        Outcome {
            result,
            fs: self.fs,
            log,
        }
    }
}

impl Outcome {
    pub fn unwrap(self) -> (AssembledWorkflow, MockFileSystem, InvocationLog) {
        match self.result {
            Ok(wf) => (wf, self.fs, self.log),
            Err(e) => panic!("assembly failed: {e}"),
        }
    }
}

pub fn data_file(name: &str) -> String {
    format!("{DATA_DIR}/{name}")
}

pub fn read_table(fs: &MockFileSystem, name: &str) -> Table {
    Table::read(fs, Path::new(&data_file(name))).expect("table in data dir")
}

pub fn jobs_of<'a>(wf: &'a AssembledWorkflow, transformation: &str) -> Vec<&'a Job> {
    wf.workflow
        .jobs()
        .iter()
        .filter(|j| j.transformation() == transformation)
        .collect()
}

pub fn output_names(job: &Job) -> Vec<String> {
    job.outputs().map(|u| u.file.lfn().to_string()).collect()
}

pub fn input_names(job: &Job) -> Vec<String> {
    job.inputs().map(|f| f.lfn().to_string()).collect()
}
