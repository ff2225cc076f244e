// src/pipeline/band.rs

//! Per-band job chain: reproject, fit overlaps, model and remove the
//! background, co-add, render a grayscale preview.
//!
//! The builder runs the tabulation tools once to learn which images exist
//! and how they overlap, then registers one job per image or pair plus the
//! fixed per-band jobs. No job names another job; everything is wired by
//! file names from [`super::naming`].

use tracing::{debug, info, warn};

use crate::catalog::replica::ARCHIVE_SITE;
use crate::dag::{File, Job};
use crate::errors::Result;
use crate::table::{Column, Table};

use super::context::GenerationContext;
use super::discovery::discover_images;
use super::naming::{self, BandFiles};
use super::region::RegionFiles;
use super::request::{BandSpec, Center};

/// What a finished band contributes to the rest of the workflow.
#[derive(Debug, Clone)]
pub struct BandOutputs {
    pub id: u32,
    pub color: String,
    pub mosaic: File,
    pub mosaic_jpg: File,
    /// Jobs this band registered.
    pub jobs: usize,
    pub images: usize,
    pub overlaps: usize,
}

/// Discover, tabulate and register every job for one band.
pub async fn add_band(
    ctx: &mut GenerationContext,
    regions: &RegionFiles,
    band: &BandSpec,
    center: &Center,
    degrees: f64,
) -> Result<BandOutputs> {
    info!(
        band = band.id,
        survey = %band.survey,
        filter = %band.filter,
        color = %band.color,
        "adding band"
    );
    let files = BandFiles::new(band.id);
    let jobs_before = ctx.workflow.len();

    let images_tbl = discover_images(ctx, band, center, degrees).await?;
    tabulate_images(ctx, &files, &images_tbl, regions).await?;
    compute_overlaps(ctx, &files).await?;
    let stat_tbl = write_stat_table(ctx, &files)?;

    let images = ctx.read_table(&images_tbl)?;
    if images.is_empty() {
        warn!(band = band.id, "archive search returned no images");
    }
    add_projection_jobs(ctx, regions, &images)?;

    let diffs = ctx.read_table(&files.diffs_tbl())?;
    let fit_txts = add_diff_fit_jobs(ctx, &files, regions, &diffs)?;
    let fits_tbl = add_concat_fit_job(ctx, &files, &stat_tbl, &fit_txts);
    let corrections_tbl = add_bg_model_job(ctx, &files, &images_tbl, &fits_tbl);

    let raw = ctx.read_table(&files.raw_tbl())?;
    add_background_jobs(ctx, &files, &raw, &corrections_tbl)?;

    let corrected = ctx.read_table(&files.corrected_tbl())?;
    let updated_tbl = add_imgtbl_job(ctx, &files, &corrected)?;
    let mosaic = add_coadd_job(ctx, &files, regions, &updated_tbl, &corrected)?;
    let mosaic_jpg = add_gray_jpeg_job(ctx, &files, &mosaic);

    let jobs = ctx.workflow.len() - jobs_before;
    info!(
        band = band.id,
        jobs,
        images = images.len(),
        overlaps = diffs.len(),
        "band added"
    );

    Ok(BandOutputs {
        id: band.id,
        color: band.color.clone(),
        mosaic,
        mosaic_jpg,
        jobs,
        images: images.len(),
        overlaps: diffs.len(),
    })
}

/// Register the three image tables and let `mDAGTbls` fill them in.
async fn tabulate_images(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    images_tbl: &File,
    regions: &RegionFiles,
) -> Result<()> {
    let raw = files.raw_tbl();
    let projected = files.projected_tbl();
    let corrected = files.corrected_tbl();
    for tbl in [&raw, &projected, &corrected] {
        ctx.register_local(tbl);
    }

    let invocation = ctx.tool("mDAGTbls").args([
        images_tbl.lfn(),
        regions.oversized.lfn(),
        raw.lfn(),
        projected.lfn(),
        corrected.lfn(),
    ]);
    debug!(band = files.id(), %invocation, "running");
    ctx.run_tool(invocation).await
}

async fn compute_overlaps(ctx: &mut GenerationContext, files: &BandFiles) -> Result<()> {
    let invocation = ctx
        .tool("mOverlaps")
        .args([files.raw_tbl().lfn(), files.diffs_tbl().lfn()]);
    debug!(band = files.id(), %invocation, "running");
    ctx.run_tool(invocation).await
}

/// Copy the overlap table with a `stat` column naming each pair's fit file.
fn write_stat_table(ctx: &mut GenerationContext, files: &BandFiles) -> Result<File> {
    let mut table = ctx.read_table(&files.diffs_tbl())?;
    let stats = table
        .column("diff")?
        .into_iter()
        .map(|diff| files.fit_txt(diff).lfn().to_string())
        .collect();
    table.set_column(Column::new("stat").with_kind("char"), stats)?;

    let stat_tbl = files.stat_tbl();
    ctx.write_table(&stat_tbl, &table)?;
    ctx.register_local(&stat_tbl);
    Ok(stat_tbl)
}

/// One `mProject` per discovered image; the image itself is fetched from
/// the archive URL in its row.
fn add_projection_jobs(
    ctx: &mut GenerationContext,
    regions: &RegionFiles,
    images: &Table,
) -> Result<()> {
    for row in images.rows() {
        let base = naming::image_base(row.get("file")?);
        let input = File::new(format!("{base}.fits"));
        ctx.replicas
            .add_replica(ARCHIVE_SITE, input.lfn(), row.get("URL")?);

        let projected = naming::projected(&base);
        let area = naming::projected_area(&base);
        let mut job = Job::new("mProject");
        job.add_inputs([&regions.oversized, &input])
            .add_outputs([&projected, &area], false)
            .arg("-X")
            .arg(&input)
            .arg(&projected)
            .arg(&regions.oversized);
        ctx.add_job(job);
    }
    Ok(())
}

/// One `mDiffFit` per overlapping pair. Returns the fit files in row order.
fn add_diff_fit_jobs(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    regions: &RegionFiles,
    diffs: &Table,
) -> Result<Vec<File>> {
    let mut fit_txts = Vec::with_capacity(diffs.len());
    for row in diffs.rows() {
        let diff = row.get("diff")?;
        let plus = File::new(format!("p{}", row.get("plus")?));
        let plus_area = File::new(naming::area_companion(plus.lfn()));
        let minus = File::new(format!("p{}", row.get("minus")?));
        let minus_area = File::new(naming::area_companion(minus.lfn()));
        let fit_txt = files.fit_txt(diff);
        let diff_fits = files.diff_fits(diff);

        let mut job = Job::new("mDiffFit");
        job.add_inputs([&plus, &plus_area, &minus, &minus_area, &regions.oversized])
            .add_outputs([&fit_txt], false)
            .args(["-d", "-s"])
            .arg(&fit_txt)
            .arg(&plus)
            .arg(&minus)
            .arg(&diff_fits)
            .arg(&regions.oversized);
        ctx.add_job(job);
        fit_txts.push(fit_txt);
    }
    Ok(fit_txts)
}

fn add_concat_fit_job(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    stat_tbl: &File,
    fit_txts: &[File],
) -> File {
    let fits_tbl = files.fits_tbl();
    let mut job = Job::new("mConcatFit");
    job.add_inputs([stat_tbl])
        .add_inputs(fit_txts)
        .add_outputs([&fits_tbl], false)
        .arg(stat_tbl)
        .arg(&fits_tbl)
        .arg(".");
    ctx.add_job(job);
    fits_tbl
}

fn add_bg_model_job(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    images_tbl: &File,
    fits_tbl: &File,
) -> File {
    let corrections_tbl = files.corrections_tbl();
    let iterations = ctx.config.background.iterations;
    let mut job = Job::new("mBgModel");
    job.add_inputs([images_tbl, fits_tbl])
        .add_outputs([&corrections_tbl], false)
        .arg("-i")
        .arg(iterations)
        .arg(images_tbl)
        .arg(fits_tbl)
        .arg(&corrections_tbl);
    ctx.add_job(job);
    corrections_tbl
}

/// One `mBackground` per image that survived tabulation.
fn add_background_jobs(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    raw: &Table,
    corrections_tbl: &File,
) -> Result<()> {
    let projected_tbl = files.projected_tbl();
    for row in raw.rows() {
        let base = naming::base_name(row.get("file")?);
        let projected = naming::projected(&base);
        let projected_area = naming::projected_area(&base);
        let corrected = naming::corrected(&base);
        let corrected_area = naming::corrected_area(&base);

        let mut job = Job::new("mBackground");
        job.add_inputs([&projected, &projected_area, &projected_tbl, corrections_tbl])
            .add_outputs([&corrected, &corrected_area], false)
            .arg("-t")
            .arg(&projected)
            .arg(&corrected)
            .arg(&projected_tbl)
            .arg(corrections_tbl);
        ctx.add_job(job);
    }
    Ok(())
}

/// Re-tabulate the corrected images; the tabulated offsets are only
/// approximate until the images exist.
fn add_imgtbl_job(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    corrected: &Table,
) -> Result<File> {
    let corrected_tbl = files.corrected_tbl();
    let updated_tbl = files.updated_corrected_tbl();

    let mut job = Job::new("mImgtbl");
    job.add_inputs([&corrected_tbl])
        .add_outputs([&updated_tbl], false)
        .arg(".")
        .arg("-t")
        .arg(&corrected_tbl)
        .arg(&updated_tbl);
    for name in corrected.column("file")? {
        let image = File::new(format!("{}.fits", naming::base_name(name)));
        job.add_inputs([&image]);
    }
    ctx.add_job(job);
    Ok(updated_tbl)
}

fn add_coadd_job(
    ctx: &mut GenerationContext,
    files: &BandFiles,
    regions: &RegionFiles,
    updated_tbl: &File,
    corrected: &Table,
) -> Result<File> {
    let mosaic = files.mosaic();
    let mosaic_area = files.mosaic_area();

    let mut job = Job::new("mAdd");
    job.add_inputs([updated_tbl, &regions.region])
        .add_outputs([&mosaic, &mosaic_area], true)
        .arg("-e")
        .arg(updated_tbl)
        .arg(&regions.region)
        .arg(&mosaic);
    for name in corrected.column("file")? {
        let base = naming::base_name(name);
        let image = File::new(format!("{base}.fits"));
        let area = File::new(format!("{base}_area.fits"));
        job.add_inputs([&image, &area]);
    }
    ctx.add_job(job);
    Ok(mosaic)
}

fn add_gray_jpeg_job(ctx: &mut GenerationContext, files: &BandFiles, mosaic: &File) -> File {
    let jpg = files.mosaic_jpg();
    let mut job = Job::new("mJPEG");
    job.add_inputs([mosaic])
        .add_outputs([&jpg], true)
        .args(["-ct", "0", "-gray"])
        .arg(mosaic)
        .args(["0s", "99.999%", "gaussian", "-out"])
        .arg(&jpg);
    ctx.add_job(job);
    jpg
}
