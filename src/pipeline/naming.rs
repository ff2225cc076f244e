// src/pipeline/naming.rs

//! File naming rules shared by every pipeline stage.
//!
//! Later stages find earlier outputs only by re-deriving names from the same
//! table rows, so every name is built here and nowhere else.

use std::sync::LazyLock;

use regex::Regex;

use crate::dag::File;

/// Nominal output grid.
pub const REGION_HDR: &str = "region.hdr";

/// Padded grid used up to background correction.
pub const REGION_OVERSIZED_HDR: &str = "region-oversized.hdr";

/// Three-color composite.
pub const COLOR_JPG: &str = "mosaic-color.jpg";

static DIFF_PREFIX_OR_FITS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(diff\.|\.fits.*)").expect("valid regex"));

static FITS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.fits.*").expect("valid regex"));

/// Base identifier of a table entry: every `diff.` and everything from
/// `.fits` onwards removed.
///
/// `diff.000001.000002.fits` -> `000001.000002`, `img.fits.gz` -> `img`.
pub fn base_name(name: &str) -> String {
    DIFF_PREFIX_OR_FITS_SUFFIX.replace_all(name, "").into_owned()
}

/// Base identifier of a discovered image: everything from `.fits` onwards
/// removed.
pub fn image_base(name: &str) -> String {
    FITS_SUFFIX.replace_all(name, "").into_owned()
}

/// Pixel-coverage companion of an image: `x.fits` -> `x_area.fits`.
pub fn area_companion(lfn: &str) -> String {
    lfn.replace(".fits", "_area.fits")
}

/// Reprojected image for a base identifier.
pub fn projected(base: &str) -> File {
    File::new(format!("p{base}.fits"))
}

pub fn projected_area(base: &str) -> File {
    File::new(format!("p{base}_area.fits"))
}

/// Background-corrected image for a base identifier.
pub fn corrected(base: &str) -> File {
    File::new(format!("c{base}.fits"))
}

pub fn corrected_area(base: &str) -> File {
    File::new(format!("c{base}_area.fits"))
}

/// Per-band file names. Everything a band produces is prefixed with its id,
/// so several bands share one data directory without collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandFiles {
    id: u32,
}

impl BandFiles {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    fn named(&self, suffix: &str) -> File {
        File::new(format!("{}-{suffix}", self.id))
    }

    pub fn images_tbl(&self) -> File {
        self.named("images.tbl")
    }

    pub fn raw_tbl(&self) -> File {
        self.named("raw.tbl")
    }

    pub fn projected_tbl(&self) -> File {
        self.named("projected.tbl")
    }

    pub fn corrected_tbl(&self) -> File {
        self.named("corrected.tbl")
    }

    pub fn diffs_tbl(&self) -> File {
        self.named("diffs.tbl")
    }

    pub fn stat_tbl(&self) -> File {
        self.named("stat.tbl")
    }

    pub fn fits_tbl(&self) -> File {
        self.named("fits.tbl")
    }

    pub fn corrections_tbl(&self) -> File {
        self.named("corrections.tbl")
    }

    pub fn updated_corrected_tbl(&self) -> File {
        self.named("updated-corrected.tbl")
    }

    pub fn mosaic(&self) -> File {
        self.named("mosaic.fits")
    }

    pub fn mosaic_area(&self) -> File {
        self.named("mosaic_area.fits")
    }

    pub fn mosaic_jpg(&self) -> File {
        self.named("mosaic.jpg")
    }

    /// Fit parameters for one overlap row, keyed by its `diff` entry.
    ///
    /// The stat table and the `mDiffFit` job both call this; the fit
    /// concatenation step relies on the two agreeing byte for byte.
    pub fn fit_txt(&self, diff: &str) -> File {
        self.named(&format!("fit.{}.txt", base_name(diff)))
    }

    /// Difference image written by `mDiffFit` (argument only, never staged).
    pub fn diff_fits(&self, diff: &str) -> File {
        self.named(&format!("diff.{}.fits", base_name(diff)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_diff_prefix_and_fits_suffix() {
        assert_eq!(base_name("diff.000001.000002.fits"), "000001.000002");
        assert_eq!(base_name("img-a.fits.gz"), "img-a");
        assert_eq!(base_name("img-a.fits[0]"), "img-a");
        assert_eq!(base_name("no-suffix"), "no-suffix");
    }

    #[test]
    fn image_base_keeps_diff_text() {
        assert_eq!(image_base("diff.survey.fits.gz"), "diff.survey");
        assert_eq!(base_name("diff.survey.fits.gz"), "survey");
    }

    #[test]
    fn companions_and_prefixes() {
        assert_eq!(area_companion("pimg-a.fits"), "pimg-a_area.fits");
        assert_eq!(projected("img-a").lfn(), "pimg-a.fits");
        assert_eq!(projected_area("img-a").lfn(), "pimg-a_area.fits");
        assert_eq!(corrected("img-a").lfn(), "cimg-a.fits");
        assert_eq!(corrected_area("img-a").lfn(), "cimg-a_area.fits");
    }

    #[test]
    fn band_files_are_prefixed_with_band_id() {
        let band = BandFiles::new(2);
        assert_eq!(band.images_tbl().lfn(), "2-images.tbl");
        assert_eq!(band.updated_corrected_tbl().lfn(), "2-updated-corrected.tbl");
        assert_eq!(band.mosaic_area().lfn(), "2-mosaic_area.fits");
        assert_eq!(band.fit_txt("diff.000000.000001.fits").lfn(), "2-fit.000000.000001.txt");
        assert_eq!(band.diff_fits("diff.000000.000001.fits").lfn(), "2-diff.000000.000001.fits");
    }
}
