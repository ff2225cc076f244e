// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::CatalogMode;

/// Command-line arguments for `montage-workflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "montage-workflow",
    version,
    about = "Generate a Pegasus workflow that builds a Montage mosaic of a sky region.",
    long_about = None
)]
pub struct CliArgs {
    /// Work directory; generated files go to `<work-dir>/data`.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Center of the output, for example "56.5 23.75" (or an object name
    /// such as M17, which the archive search understands).
    #[arg(long, value_name = "CENTER", allow_hyphen_values = true)]
    pub center: String,

    /// Number of degrees of side of the output.
    #[arg(long, value_name = "DEGREES")]
    pub degrees: f64,

    /// Band definition, repeatable. Example: dss:DSS2B:red
    #[arg(long = "band", value_name = "SURVEY:FILTER:COLOR", required = true)]
    pub bands: Vec<String>,

    /// Transformation catalog: regular or container.
    ///
    /// If omitted, `[catalog].mode` from the config file or `regular` is used.
    #[arg(long, value_enum, value_name = "MODE")]
    pub tc_target: Option<CatalogMode>,

    /// Optional TOML file overriding generator defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONTAGE_WORKFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the request and print the plan, but don't run any tools or
    /// write any files.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
