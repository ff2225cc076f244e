// src/catalog/transformation.rs

//! Transformation catalog: which executables exist and how to run them.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::CatalogSection;
use crate::errors::{Result, WorkflowError};
use crate::fs::FileSystem;
use crate::types::CatalogMode;

/// Profile namespace read by the workflow planner.
pub const PEGASUS_NAMESPACE: &str = "pegasus";

/// Profile namespace for environment variables.
pub const ENV_NAMESPACE: &str = "env";

/// Some Montage tools shell out to others at run time; the packaging step
/// must ship those alongside.
const REQUIREMENTS: &[(&str, &[&str])] = &[("mDiffFit", &["mDiff", "mFitplane"])];

/// `namespace -> key -> value`.
pub type Profiles = BTreeMap<String, BTreeMap<String, String>>;

/// Container image the executables are installed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    /// Container technology, e.g. `singularity`.
    pub kind: String,
    pub image: String,
    pub profiles: Profiles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub name: String,
    pub site: String,
    pub pfn: String,
    pub is_stageable: bool,
    /// Name of a [`Container`] registered in the same catalog.
    pub container: Option<String>,
    pub profiles: Profiles,
    /// Other transformations that must be available when this one runs.
    /// Packaging only; never a job-graph edge.
    pub requires: Vec<String>,
}

impl Transformation {
    pub fn add_profile(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.profiles
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn add_requirement(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.requires.contains(&name) {
            self.requires.push(name);
        }
    }

    /// `pegasus.clusters.size`, if set.
    pub fn cluster_size(&self) -> Option<&str> {
        self.profiles
            .get(PEGASUS_NAMESPACE)
            .and_then(|p| p.get("clusters.size"))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformationCatalog {
    transformations: Vec<Transformation>,
    containers: Vec<Container>,
}

impl TransformationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transformation(&mut self, transformation: Transformation) {
        self.transformations.push(transformation);
    }

    pub fn add_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn get(&self, name: &str) -> Option<&Transformation> {
        self.transformations.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Transformation> {
        self.transformations.iter_mut().find(|t| t.name == name)
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

/// Locate `name` in the directories of a `$PATH`-style list.
pub fn which(fs: &dyn FileSystem, name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| fs.exists(candidate))
}

/// Register every executable installed next to the reference executable.
///
/// `path_var` is the search path (normally `$PATH`). Hidden entries are
/// skipped; entries are registered in name order.
pub fn build_transformation_catalog(
    fs: &dyn FileSystem,
    mode: CatalogMode,
    cfg: &CatalogSection,
    path_var: Option<&OsStr>,
) -> Result<TransformationCatalog> {
    let reference = &cfg.reference_executable;
    let full_path = path_var
        .and_then(|p| which(fs, reference, p))
        .ok_or_else(|| WorkflowError::ExecutableNotFound(reference.clone()))?;
    let base_dir = full_path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| WorkflowError::ExecutableNotFound(reference.clone()))?;

    info!(dir = %base_dir.display(), %mode, "building transformation catalog");

    let mut tc = TransformationCatalog::new();

    let container = match mode {
        CatalogMode::Container => {
            let mut profiles = Profiles::new();
            profiles
                .entry(ENV_NAMESPACE.to_string())
                .or_default()
                .insert("MONTAGE_HOME".to_string(), cfg.container_home.clone());
            let container = Container {
                name: cfg.container_name.clone(),
                kind: "singularity".to_string(),
                image: cfg.container_image.clone(),
                profiles,
            };
            tc.add_container(container);
            Some(cfg.container_name.clone())
        }
        CatalogMode::Regular => None,
    };

    let mut names: Vec<String> = Vec::new();
    for entry in fs.read_dir(&base_dir)? {
        match entry.file_name().and_then(OsStr::to_str) {
            Some(name) if name.starts_with('.') => continue,
            Some(name) => names.push(name.to_string()),
            None => warn!(path = %entry.display(), "skipping non UTF-8 entry"),
        }
    }
    names.sort();

    for name in names {
        let mut transformation = Transformation {
            pfn: base_dir.join(&name).display().to_string(),
            name,
            site: cfg.site.clone(),
            is_stageable: container.is_none(),
            container: container.clone(),
            profiles: Profiles::new(),
            requires: Vec::new(),
        };

        // some transformations can be clustered for efficiency
        if cfg.clustered.contains(&transformation.name) {
            transformation.add_profile(
                PEGASUS_NAMESPACE,
                "clusters.size",
                cfg.cluster_size.to_string(),
            );
        }

        debug!(name = %transformation.name, pfn = %transformation.pfn, "adding transformation");
        tc.add_transformation(transformation);
    }

    for (name, deps) in REQUIREMENTS {
        for dep in deps.iter() {
            if tc.get(dep).is_none() {
                return Err(WorkflowError::MissingTransformation(dep.to_string()));
            }
        }
        let transformation = tc
            .get_mut(name)
            .ok_or_else(|| WorkflowError::MissingTransformation(name.to_string()))?;
        for dep in deps.iter() {
            transformation.add_requirement(*dep);
        }
    }

    info!(transformations = tc.len(), "transformation catalog built");
    Ok(tc)
}
