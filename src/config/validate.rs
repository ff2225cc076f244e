// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WorkflowError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WorkflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_catalog(cfg)?;
    validate_region(cfg)?;
    validate_discovery(cfg)?;
    validate_background(cfg)?;
    validate_output(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> WorkflowError {
    WorkflowError::ConfigError(msg.into())
}

fn validate_catalog(cfg: &RawConfigFile) -> Result<()> {
    let catalog = &cfg.catalog;
    if catalog.site.trim().is_empty() {
        return Err(config_error("[catalog].site must not be empty"));
    }
    if catalog.reference_executable.trim().is_empty() {
        return Err(config_error(
            "[catalog].reference_executable must not be empty",
        ));
    }
    if catalog.cluster_size == 0 {
        return Err(config_error("[catalog].cluster_size must be >= 1 (got 0)"));
    }
    if catalog.container_name.trim().is_empty() {
        return Err(config_error("[catalog].container_name must not be empty"));
    }
    Ok(())
}

fn validate_region(cfg: &RawConfigFile) -> Result<()> {
    let region = &cfg.region;
    if !(region.pixel_scale.is_finite() && region.pixel_scale > 0.0) {
        return Err(config_error(format!(
            "[region].pixel_scale must be a positive number (got {})",
            region.pixel_scale
        )));
    }
    if region.oversize_padding == 0 || region.oversize_padding % 2 != 0 {
        return Err(config_error(format!(
            "[region].oversize_padding must be a positive even number (got {})",
            region.oversize_padding
        )));
    }
    Ok(())
}

fn validate_discovery(cfg: &RawConfigFile) -> Result<()> {
    let over_fetch = cfg.discovery.over_fetch;
    if !(over_fetch.is_finite() && over_fetch >= 1.0) {
        return Err(config_error(format!(
            "[discovery].over_fetch must be >= 1.0 (got {over_fetch})"
        )));
    }
    Ok(())
}

fn validate_background(cfg: &RawConfigFile) -> Result<()> {
    if cfg.background.iterations == 0 {
        return Err(config_error(
            "[background].iterations must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn validate_output(cfg: &RawConfigFile) -> Result<()> {
    let output = &cfg.output;
    for (key, value) in [
        ("workflow_name", &output.workflow_name),
        ("data_dir", &output.data_dir),
        ("file_name", &output.file_name),
    ] {
        if value.trim().is_empty() {
            return Err(config_error(format!("[output].{key} must not be empty")));
        }
    }
    for (key, value) in [
        ("data_dir", &output.data_dir),
        ("file_name", &output.file_name),
    ] {
        if !is_plain_name(value) {
            return Err(config_error(format!(
                "[output].{key} must be a plain name inside the work dir (got '{value}')"
            )));
        }
    }
    Ok(())
}

/// One path component, no separators, not `.` or `..`.
fn is_plain_name(value: &str) -> bool {
    let value = value.trim();
    !value.contains(['/', '\\']) && value != "." && value != ".."
}
