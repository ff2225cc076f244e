// src/pipeline/region.rs

//! Output grid ("region header") generation.

use tracing::info;

use crate::dag::File;
use crate::errors::Result;

use super::context::GenerationContext;
use super::naming::{REGION_HDR, REGION_OVERSIZED_HDR};
use super::request::Center;

/// A TAN-projected pixel grid in FITS header terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionDescriptor {
    /// Pixels per axis (the grid is square).
    pub naxis: u64,
    /// Reference pixel, 1-based, on both axes.
    pub crpix: f64,
    pub crval1: f64,
    pub crval2: f64,
    /// Degrees per pixel.
    pub cdelt: f64,
    pub crota2: f64,
    pub equinox: u32,
}

impl RegionDescriptor {
    /// Grid covering exactly `degrees` on a side around `(ra, dec)`.
    pub fn nominal(ra: f64, dec: f64, degrees: f64, pixel_scale: f64) -> Self {
        let naxis = (degrees / pixel_scale + 0.5) as u64;
        Self {
            naxis,
            crpix: (naxis as f64 + 1.0) / 2.0,
            crval1: ra,
            crval2: dec,
            cdelt: pixel_scale,
            crota2: 0.0,
            equinox: 2000,
        }
    }

    /// Same center and scale, `padding` more pixels per axis, reference
    /// pixel shifted by half the padding.
    pub fn oversized(&self, padding: u32) -> Self {
        Self {
            naxis: self.naxis + u64::from(padding),
            crpix: self.crpix + f64::from(padding / 2),
            ..*self
        }
    }

    /// FITS header text understood by the Montage tools.
    pub fn to_header(&self) -> String {
        let cards = [
            ("SIMPLE", "T".to_string()),
            ("BITPIX", "-64".to_string()),
            ("NAXIS", "2".to_string()),
            ("NAXIS1", self.naxis.to_string()),
            ("NAXIS2", self.naxis.to_string()),
            ("CTYPE1", "'RA---TAN'".to_string()),
            ("CTYPE2", "'DEC--TAN'".to_string()),
            ("CRVAL1", format!("{:.6}", self.crval1)),
            ("CRVAL2", format!("{:.6}", self.crval2)),
            ("CRPIX1", format!("{:.6}", self.crpix)),
            ("CRPIX2", format!("{:.6}", self.crpix)),
            ("CDELT1", format!("{:.9}", -self.cdelt)),
            ("CDELT2", format!("{:.9}", self.cdelt)),
            ("CROTA2", format!("{:.6}", self.crota2)),
            ("EQUINOX", self.equinox.to_string()),
        ];

        let mut out = String::new();
        for (key, value) in cards {
            out.push_str(&format!("{key:<8}= {value}\n"));
        }
        out.push_str("END\n");
        out
    }
}

/// The two shared grid files every band pipeline reads.
#[derive(Debug, Clone)]
pub struct RegionFiles {
    pub region: File,
    pub oversized: File,
    pub nominal_grid: RegionDescriptor,
    pub oversized_grid: RegionDescriptor,
}

/// Compute both grids, write them to the data directory and register them
/// as `region.hdr` and `region-oversized.hdr`.
pub fn generate_region_hdr(
    ctx: &mut GenerationContext,
    center: &Center,
    degrees: f64,
) -> Result<RegionFiles> {
    let (ra, dec) = center.require_coords()?;

    let nominal_grid = RegionDescriptor::nominal(ra, dec, degrees, ctx.config.region.pixel_scale);
    let oversized_grid = nominal_grid.oversized(ctx.config.region.oversize_padding);

    let region = File::new(REGION_HDR);
    let oversized = File::new(REGION_OVERSIZED_HDR);

    for (file, grid) in [(&region, &nominal_grid), (&oversized, &oversized_grid)] {
        ctx.fs
            .write(&ctx.data_path(file), grid.to_header().as_bytes())?;
        ctx.register_local(file);
    }

    info!(
        naxis = nominal_grid.naxis,
        oversized_naxis = oversized_grid.naxis,
        "region headers written"
    );

    Ok(RegionFiles {
        region,
        oversized,
        nominal_grid,
        oversized_grid,
    })
}
