// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod table;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::engine::WorkflowAssembler;
use crate::exec::ProcessToolRunner;
use crate::fs::RealFileSystem;
use crate::pipeline::{ColorMap, MosaicRequest, RegionDescriptor};
use crate::types::CatalogMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the `--tc-target` override
/// - request validation
/// - the real filesystem and process runner
/// - the workflow assembler
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let mode = args.tc_target.or(cfg.catalog.mode).unwrap_or_default();
    let request = MosaicRequest::new(&args.center, args.degrees, &args.bands)?;
    let work_dir = args.work_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    if args.dry_run {
        print_dry_run(&cfg, mode, &request, &work_dir);
        return Ok(());
    }

    let assembler = WorkflowAssembler::new(
        Arc::new(RealFileSystem),
        Box::new(ProcessToolRunner::new()),
        cfg,
        work_dir,
    )
    .with_mode(mode);

    let assembled = assembler.assemble(&request).await?;
    info!(
        jobs = assembled.workflow.len(),
        bands = assembled.bands.len(),
        composite = assembled.composite.is_some(),
        path = %assembled.output_path.display(),
        "done"
    );
    Ok(())
}

/// Print what a real run would do, without running tools or writing files.
fn print_dry_run(cfg: &ConfigFile, mode: CatalogMode, request: &MosaicRequest, work_dir: &Path) {
    let data_dir = work_dir.join(&cfg.output.data_dir);

    println!("montage-workflow dry-run");
    println!("  center = {}", request.center);
    println!("  degrees = {}", request.degrees);
    println!("  transformation catalog = {mode}");
    println!(
        "  output = {}",
        data_dir.join(&cfg.output.file_name).display()
    );
    println!();

    match request.center.coords() {
        Some((ra, dec)) => {
            let grid = RegionDescriptor::nominal(ra, dec, request.degrees, cfg.region.pixel_scale);
            let big = grid.oversized(cfg.region.oversize_padding);
            println!("grid:");
            println!("  region.hdr: {0} x {0} px, crpix {1}", grid.naxis, grid.crpix);
            println!(
                "  region-oversized.hdr: {0} x {0} px, crpix {1}",
                big.naxis, big.crpix
            );
        }
        None => println!("grid: center is not numeric; a real run will refuse it"),
    }
    println!();

    let mut colors = ColorMap::new();
    println!("bands ({}):", request.bands.len());
    for band in &request.bands {
        println!(
            "  - {}: {} {} -> {}",
            band.id, band.survey, band.filter, band.color
        );
        colors.assign(&band.color, band.id);
    }
    match colors.rgb() {
        Some((r, g, b)) => println!("color composite: red={r} green={g} blue={b}"),
        None => println!("color composite: no"),
    }

    debug!("dry-run complete (no tools run)");
}
