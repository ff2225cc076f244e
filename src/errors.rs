// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Every variant is fatal: the generator never retries, it reports the error
//! and exits before a partial workflow can be written.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{} directory already exists", .0.display())]
    WorkDirExists(PathBuf),

    #[error("{0} is not in the $PATH")]
    ExecutableNotFound(String),

    #[error("Transformation not found in catalog: {0}")]
    MissingTransformation(String),

    #[error("Command failed: {tool} exited with status {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("Table error: {0}")]
    TableError(String),

    #[error("job {job} consumes '{lfn}', which no earlier job produces and no replica provides")]
    UnresolvedInput { job: String, lfn: String },

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WorkflowError>;
