#![allow(dead_code)]

use std::ffi::OsString;

use montage_workflow::config::{ConfigFile, RawConfigFile};
use montage_workflow::fs::mock::MockFileSystem;
use montage_workflow::table::{ipac, Column, Table};
use montage_workflow::types::CatalogMode;

use crate::fake_runner::FakeToolRunner;

/// Executables installed by [`install_montage`].
pub const MONTAGE_TOOLS: &[&str] = &[
    "mAdd",
    "mArchiveList",
    "mBackground",
    "mBgModel",
    "mConcatFit",
    "mDAGTbls",
    "mDiff",
    "mDiffFit",
    "mFitplane",
    "mImgtbl",
    "mJPEG",
    "mOverlaps",
    "mProject",
];

/// Put a fake Montage install into `bin_dir` and return a search path that
/// finds it.
pub fn install_montage(fs: &MockFileSystem, bin_dir: &str) -> OsString {
    for tool in MONTAGE_TOOLS {
        fs.add_file(format!("{bin_dir}/{tool}"), "#!/bin/sh\n");
    }
    OsString::from(format!("/usr/bin:{bin_dir}"))
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_mode(mut self, mode: CatalogMode) -> Self {
        self.config.catalog.mode = Some(mode);
        self
    }

    pub fn with_site(mut self, site: &str) -> Self {
        self.config.catalog.site = site.to_string();
        self
    }

    pub fn with_pixel_scale(mut self, scale: f64) -> Self {
        self.config.region.pixel_scale = scale;
        self
    }

    pub fn with_oversize_padding(mut self, padding: u32) -> Self {
        self.config.region.oversize_padding = padding;
        self
    }

    pub fn with_over_fetch(mut self, factor: f64) -> Self {
        self.config.discovery.over_fetch = factor;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.config.background.iterations = iterations;
        self
    }

    pub fn with_workflow_name(mut self, name: &str) -> Self {
        self.config.output.workflow_name = name.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn char_column(name: &str) -> Column {
    Column::new(name).with_kind("char")
}

/// `mArchiveList` output: `cntr`, `file`, `URL`.
pub fn images_table(rows: &[(&str, &str)]) -> String {
    let mut t = Table::new(vec![
        Column::new("cntr").with_kind("int"),
        char_column("file"),
        char_column("URL"),
    ]);
    for (i, (file, url)) in rows.iter().enumerate() {
        t.push_row([i.to_string(), file.to_string(), url.to_string()])
            .expect("images row");
    }
    ipac::format(&t)
}

/// `mDAGTbls` output: one `file` per image.
pub fn file_table(files: &[String]) -> String {
    let mut t = Table::new(vec![Column::new("cntr").with_kind("int"), char_column("file")]);
    for (i, file) in files.iter().enumerate() {
        t.push_row([i.to_string(), file.clone()]).expect("file row");
    }
    ipac::format(&t)
}

/// `mOverlaps` output: `plus`, `minus`, `diff` per overlapping pair.
pub fn diffs_table(rows: &[(String, String, String)]) -> String {
    let mut t = Table::new(vec![
        Column::new("cntr1").with_kind("int"),
        Column::new("cntr2").with_kind("int"),
        char_column("plus"),
        char_column("minus"),
        char_column("diff"),
    ]);
    for (i, (plus, minus, diff)) in rows.iter().enumerate() {
        t.push_row([
            i.to_string(),
            (i + 1).to_string(),
            plus.clone(),
            minus.clone(),
            diff.clone(),
        ])
        .expect("diff row");
    }
    ipac::format(&t)
}

/// Canned tool output for one band: its images and which of them overlap.
#[derive(Debug, Clone)]
pub struct BandFixture {
    pub id: u32,
    pub images: Vec<String>,
    pub overlaps: Vec<(usize, usize)>,
}

impl BandFixture {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            images: Vec::new(),
            overlaps: Vec::new(),
        }
    }

    /// `count` images named `<prefix>-<n>.fits`, each overlapping the next.
    pub fn strip(id: u32, prefix: &str, count: usize) -> Self {
        let mut fixture = Self::new(id);
        for n in 0..count {
            fixture.images.push(format!("{prefix}-{n}.fits"));
        }
        for n in 1..count {
            fixture.overlaps.push((n - 1, n));
        }
        fixture
    }

    pub fn with_image(mut self, file: &str) -> Self {
        self.images.push(file.to_string());
        self
    }

    pub fn with_overlap(mut self, a: usize, b: usize) -> Self {
        self.overlaps.push((a, b));
        self
    }

    pub fn url(file: &str) -> String {
        format!("http://archive.example.org/data?file={file}")
    }

    pub fn diff_name(a: usize, b: usize) -> String {
        format!("diff.{a:06}.{b:06}.fits")
    }

    /// Jobs the band pipeline registers for this fixture.
    pub fn expected_jobs(&self) -> usize {
        2 * self.images.len() + self.overlaps.len() + 5
    }

    /// Make `runner` produce this band's tables.
    pub fn install(&self, runner: FakeToolRunner) -> FakeToolRunner {
        let n = self.id;
        let urls: Vec<String> = self.images.iter().map(|f| Self::url(f)).collect();
        let image_rows: Vec<(&str, &str)> = self
            .images
            .iter()
            .zip(&urls)
            .map(|(f, u)| (f.as_str(), u.as_str()))
            .collect();

        let projected: Vec<String> = self.images.iter().map(|f| format!("p{f}")).collect();
        let corrected: Vec<String> = self.images.iter().map(|f| format!("c{f}")).collect();
        let diffs: Vec<(String, String, String)> = self
            .overlaps
            .iter()
            .map(|&(a, b)| {
                (
                    self.images[a].clone(),
                    self.images[b].clone(),
                    Self::diff_name(a, b),
                )
            })
            .collect();

        runner
            .with_output("mArchiveList", &format!("{n}-images.tbl"), images_table(&image_rows))
            .with_output("mDAGTbls", &format!("{n}-raw.tbl"), file_table(&self.images))
            .with_output("mDAGTbls", &format!("{n}-projected.tbl"), file_table(&projected))
            .with_output("mDAGTbls", &format!("{n}-corrected.tbl"), file_table(&corrected))
            .with_output("mOverlaps", &format!("{n}-diffs.tbl"), diffs_table(&diffs))
    }
}
