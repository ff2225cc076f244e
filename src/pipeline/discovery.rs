// src/pipeline/discovery.rs

//! Archive search for the raw images of one band.

use tracing::info;

use crate::dag::File;
use crate::errors::Result;

use super::context::GenerationContext;
use super::naming::BandFiles;
use super::request::{BandSpec, Center};

/// Render a search width the way the archive tool expects it: shortest
/// round-trip form, with a trailing `.0` on whole numbers.
pub fn format_degrees(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Search box edge in degrees. Slightly larger than the mosaic so images
/// overlapping the border are found too.
pub fn search_width(degrees: f64, over_fetch: f64) -> f64 {
    degrees * over_fetch
}

/// Run `mArchiveList` for `band` and register the resulting `N-images.tbl`.
///
/// A failing search aborts generation; nothing is registered in that case.
pub async fn discover_images(
    ctx: &mut GenerationContext,
    band: &BandSpec,
    center: &Center,
    degrees: f64,
) -> Result<File> {
    let files = BandFiles::new(band.id);
    let images_tbl = files.images_tbl();
    let width = format_degrees(search_width(degrees, ctx.config.discovery.over_fetch));

    let invocation = ctx.tool("mArchiveList").args([
        band.survey.as_str(),
        band.filter.as_str(),
        center.as_str(),
        width.as_str(),
        width.as_str(),
        images_tbl.lfn(),
    ]);
    info!(band = band.id, survey = %band.survey, width = %width, "searching archive");
    ctx.run_tool(invocation).await?;

    ctx.register_local(&images_tbl);
    Ok(images_tbl)
}
