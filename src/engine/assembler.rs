// src/engine/assembler.rs

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{build_transformation_catalog, ReplicaCatalog, TransformationCatalog};
use crate::config::ConfigFile;
use crate::dag::document::{to_yaml, workflow_document};
use crate::dag::{infer_dependencies, Dependency, File, Workflow};
use crate::errors::{Result, WorkflowError};
use crate::exec::ToolRunner;
use crate::fs::FileSystem;
use crate::pipeline::{
    add_band, add_color_composite, generate_region_hdr, BandOutputs, ColorMap,
    GenerationContext, MosaicRequest, RegionFiles,
};
use crate::types::CatalogMode;

/// Drives one generation run from request to written workflow file.
///
/// Order of work:
/// 1. refuse to reuse an existing data directory,
/// 2. build the transformation catalog,
/// 3. create the data directory and the region headers,
/// 4. run every band pipeline in command-line order,
/// 5. add the color composite when red, green and blue are present,
/// 6. infer and validate job dependencies, then write the YAML.
///
/// Any error stops the run before the workflow file is written.
pub struct WorkflowAssembler {
    fs: Arc<dyn FileSystem>,
    runner: Box<dyn ToolRunner>,
    config: ConfigFile,
    mode: CatalogMode,
    work_dir: PathBuf,
    search_path: Option<OsString>,
}

impl fmt::Debug for WorkflowAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowAssembler")
            .field("mode", &self.mode)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl WorkflowAssembler {
    /// The catalog mode starts as `[catalog].mode` (or `regular`) and the
    /// executable search path as `$PATH`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Box<dyn ToolRunner>,
        config: ConfigFile,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        let mode = config.catalog.mode.unwrap_or_default();
        Self {
            fs,
            runner,
            config,
            mode,
            work_dir: work_dir.into(),
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_mode(mut self, mode: CatalogMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub async fn assemble(self, request: &MosaicRequest) -> Result<AssembledWorkflow> {
        let work_dir = self.fs.canonicalize(&self.work_dir)?;
        let data_dir = work_dir.join(&self.config.output.data_dir);
        if self.fs.exists(&data_dir) {
            return Err(WorkflowError::WorkDirExists(data_dir));
        }
        request.center.require_coords()?;

        let transformations = build_transformation_catalog(
            self.fs.as_ref(),
            self.mode,
            &self.config.catalog,
            self.search_path.as_deref(),
        )?;
        debug!(transformations = transformations.len(), "transformation catalog built");

        self.fs.create_dir(&data_dir)?;
        info!(dir = %data_dir.display(), "created data directory");

        let mut ctx = GenerationContext::new(self.fs, self.runner, self.config, data_dir);
        let regions = generate_region_hdr(&mut ctx, &request.center, request.degrees)?;

        let mut colors = ColorMap::new();
        let mut bands = Vec::with_capacity(request.bands.len());
        for band in &request.bands {
            let outputs =
                add_band(&mut ctx, &regions, band, &request.center, request.degrees).await?;
            colors.record(&outputs);
            bands.push(outputs);
        }
        let composite = add_color_composite(&mut ctx, &colors);

        let dependencies = infer_dependencies(&ctx.workflow, &ctx.replicas)?;

        let output_path = ctx.data_dir.join(&ctx.config.output.file_name);
        let document = workflow_document(
            &ctx.workflow,
            &dependencies,
            Some(&ctx.replicas),
            Some(&transformations),
        );
        ctx.fs.write(&output_path, to_yaml(&document)?.as_bytes())?;
        info!(
            path = %output_path.display(),
            jobs = ctx.workflow.len(),
            replicas = ctx.replicas.len(),
            "workflow written"
        );

        Ok(AssembledWorkflow {
            workflow: ctx.workflow,
            replicas: ctx.replicas,
            transformations,
            dependencies,
            regions,
            bands,
            composite,
            output_path,
        })
    }
}

/// Result of a successful run; the same data that went into the YAML file.
#[derive(Debug)]
pub struct AssembledWorkflow {
    pub workflow: Workflow,
    pub replicas: ReplicaCatalog,
    pub transformations: TransformationCatalog,
    pub dependencies: Vec<Dependency>,
    pub regions: RegionFiles,
    pub bands: Vec<BandOutputs>,
    pub composite: Option<File>,
    pub output_path: PathBuf,
}
