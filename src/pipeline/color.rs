// src/pipeline/color.rs

//! Three-color composite of the red, green and blue band mosaics.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::dag::{File, Job};
use crate::types::COMPOSITE_COLORS;

use super::band::BandOutputs;
use super::context::GenerationContext;
use super::naming::{BandFiles, COLOR_JPG};

/// Display color -> band id. Later bands replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    bands: BTreeMap<String, u32>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, color: &str, band: u32) {
        if let Some(previous) = self.bands.insert(color.to_string(), band) {
            warn!(
                color,
                previous,
                band,
                "color claimed by more than one band; the later band is used"
            );
        }
    }

    pub fn record(&mut self, outputs: &BandOutputs) {
        self.assign(&outputs.color, outputs.id);
    }

    pub fn get(&self, color: &str) -> Option<u32> {
        self.bands.get(color).copied()
    }

    /// `(red, green, blue)` band ids once all three colors are present.
    pub fn rgb(&self) -> Option<(u32, u32, u32)> {
        let [red, green, blue] = COMPOSITE_COLORS.map(|c| self.get(c));
        Some((red?, green?, blue?))
    }
}

/// Register the composite job for the given red, green and blue bands.
pub fn color_jpg(ctx: &mut GenerationContext, red: u32, green: u32, blue: u32) -> File {
    let jpg = File::new(COLOR_JPG);
    let channels = [
        ("-red", BandFiles::new(red).mosaic()),
        ("-green", BandFiles::new(green).mosaic()),
        ("-blue", BandFiles::new(blue).mosaic()),
    ];

    let mut job = Job::new("mJPEG");
    job.add_inputs(channels.iter().map(|(_, mosaic)| mosaic));
    job.add_outputs([&jpg], true);
    for (flag, mosaic) in &channels {
        job.arg(flag)
            .arg(mosaic)
            .args(["-1s", "99.999%", "gaussian-log"]);
    }
    job.arg("-out").arg(&jpg);

    ctx.add_job(job);
    info!(red, green, blue, "color composite added");
    jpg
}

/// Add the composite if the color map covers red, green and blue.
pub fn add_color_composite(ctx: &mut GenerationContext, colors: &ColorMap) -> Option<File> {
    match colors.rgb() {
        Some((red, green, blue)) => Some(color_jpg(ctx, red, green, blue)),
        None => {
            info!("red, green and blue bands not all present; skipping color composite");
            None
        }
    }
}
