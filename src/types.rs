use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// How executables are registered in the transformation catalog.
///
/// - `Regular`: every executable is staged to the worker from its install
///   path (default).
/// - `Container`: executables are already installed inside a shared
///   container image and are never staged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    #[default]
    Regular,
    Container,
}

impl FromStr for CatalogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(CatalogMode::Regular),
            "container" => Ok(CatalogMode::Container),
            other => Err(format!(
                "invalid transformation catalog mode: {other} (expected \"regular\" or \"container\")"
            )),
        }
    }
}

impl fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogMode::Regular => f.write_str("regular"),
            CatalogMode::Container => f.write_str("container"),
        }
    }
}

/// Display colors that take part in the color composite.
pub const COMPOSITE_COLORS: [&str; 3] = ["red", "green", "blue"];
