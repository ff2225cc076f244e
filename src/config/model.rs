// src/config/model.rs

use serde::Deserialize;

use crate::types::CatalogMode;

/// Generator tunables as read from an (optional) TOML file.
///
/// ```toml
/// [catalog]
/// site = "condor-pool"
/// cluster_size = 3
///
/// [region]
/// pixel_scale = 0.000277778
/// oversize_padding = 3000
///
/// [discovery]
/// over_fetch = 1.42
///
/// [background]
/// iterations = 100000
///
/// [output]
/// workflow_name = "montage"
/// ```
///
/// All sections are optional and default to the values the Montage
/// workflow has always used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub region: RegionSection,

    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub background: BackgroundSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub catalog: CatalogSection,
    pub region: RegionSection,
    pub discovery: DiscoverySection,
    pub background: BackgroundSection,
    pub output: OutputSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            catalog: raw.catalog,
            region: raw.region,
            discovery: raw.discovery,
            background: raw.background,
            output: raw.output,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[catalog]` section: how executables are registered.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSection {
    /// `"regular"` or `"container"`. The `--tc-target` flag takes precedence.
    #[serde(default)]
    pub mode: Option<CatalogMode>,

    /// Execution site every transformation is registered at.
    #[serde(default = "default_site")]
    pub site: String,

    /// Executable looked up on `$PATH`; its directory is scanned for the
    /// rest of the toolkit.
    #[serde(default = "default_reference_executable")]
    pub reference_executable: String,

    /// Value of the `pegasus.clusters.size` profile.
    #[serde(default = "default_cluster_size")]
    pub cluster_size: u32,

    /// Transformations that get the clustering profile.
    #[serde(default = "default_clustered")]
    pub clustered: Vec<String>,

    #[serde(default = "default_container_name")]
    pub container_name: String,

    #[serde(default = "default_container_image")]
    pub container_image: String,

    /// `MONTAGE_HOME` inside the container.
    #[serde(default = "default_container_home")]
    pub container_home: String,
}

fn default_site() -> String {
    "condor-pool".to_string()
}

fn default_reference_executable() -> String {
    "mProject".to_string()
}

fn default_cluster_size() -> u32 {
    3
}

fn default_clustered() -> Vec<String> {
    ["gmProject", "mDiff", "mDiffFit", "mBackground"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_container_name() -> String {
    "montage".to_string()
}

fn default_container_image() -> String {
    "shub://pegasus-isi/montage-workflow-v2".to_string()
}

fn default_container_home() -> String {
    "/opt/Montage".to_string()
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            mode: None,
            site: default_site(),
            reference_executable: default_reference_executable(),
            cluster_size: default_cluster_size(),
            clustered: default_clustered(),
            container_name: default_container_name(),
            container_image: default_container_image(),
            container_home: default_container_home(),
        }
    }
}

/// `[region]` section: output grid geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionSection {
    /// Degrees per pixel (one arcsecond by default).
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f64,

    /// Extra pixels per axis for the oversized grid. Must be even so the
    /// reference pixel shifts by a whole number of pixels.
    #[serde(default = "default_oversize_padding")]
    pub oversize_padding: u32,
}

fn default_pixel_scale() -> f64 {
    0.000277778
}

fn default_oversize_padding() -> u32 {
    3000
}

impl Default for RegionSection {
    fn default() -> Self {
        Self {
            pixel_scale: default_pixel_scale(),
            oversize_padding: default_oversize_padding(),
        }
    }
}

/// `[discovery]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    /// Factor applied to the side length when searching the archive, so the
    /// rectangular search covers the projected region.
    #[serde(default = "default_over_fetch")]
    pub over_fetch: f64,
}

fn default_over_fetch() -> f64 {
    1.42
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            over_fetch: default_over_fetch(),
        }
    }
}

/// `[background]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundSection {
    /// Iteration count handed to `mBgModel -i`.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

fn default_iterations() -> u64 {
    100_000
}

impl Default for BackgroundSection {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_workflow_name")]
    pub workflow_name: String,

    /// Directory (relative to the work dir) that holds generated inputs and
    /// the workflow file. Must not exist when the generator starts.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_workflow_name() -> String {
    "montage".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_file_name() -> String {
    "montage-workflow.yml".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            workflow_name: default_workflow_name(),
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}
