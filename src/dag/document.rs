// src/dag/document.rs

//! Pegasus 5 YAML rendering of a workflow and its catalogs.
//!
//! The structs here mirror the on-disk schema one to one and are built
//! from the domain types right before writing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{ReplicaCatalog, TransformationCatalog};
use crate::errors::Result;

use super::graph::Dependency;
use super::job::Link;
use super::workflow::Workflow;

pub const PEGASUS_VERSION: &str = "5.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub pegasus: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_catalog: Option<ReplicaCatalogDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation_catalog: Option<TransformationCatalogDocument>,
    pub jobs: Vec<JobDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_dependencies: Vec<DependencyDocument>,
}

#[derive(Debug, Serialize)]
pub struct ReplicaCatalogDocument {
    pub pegasus: String,
    pub replicas: Vec<ReplicaDocument>,
}

#[derive(Debug, Serialize)]
pub struct ReplicaDocument {
    pub lfn: String,
    pub pfns: Vec<PfnDocument>,
}

#[derive(Debug, Serialize)]
pub struct PfnDocument {
    pub site: String,
    pub pfn: String,
}

#[derive(Debug, Serialize)]
pub struct TransformationCatalogDocument {
    pub pegasus: String,
    pub transformations: Vec<TransformationDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerDocument>,
}

#[derive(Debug, Serialize)]
pub struct TransformationDocument {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    pub sites: Vec<TransformationSiteDocument>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct TransformationSiteDocument {
    pub name: String,
    pub pfn: String,
    /// `stageable` or `installed`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContainerDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct JobDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub id: String,
    pub arguments: Vec<String>,
    pub uses: Vec<UseDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UseDocument {
    pub lfn: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_replica: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DependencyDocument {
    pub id: String,
    pub children: Vec<String>,
}

pub fn replica_catalog_document(rc: &ReplicaCatalog) -> ReplicaCatalogDocument {
    ReplicaCatalogDocument {
        pegasus: PEGASUS_VERSION.to_string(),
        replicas: rc
            .iter()
            .map(|(lfn, replicas)| ReplicaDocument {
                lfn: lfn.to_string(),
                pfns: replicas
                    .iter()
                    .map(|r| PfnDocument {
                        site: r.site.clone(),
                        pfn: r.pfn.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn transformation_catalog_document(tc: &TransformationCatalog) -> TransformationCatalogDocument {
    TransformationCatalogDocument {
        pegasus: PEGASUS_VERSION.to_string(),
        transformations: tc
            .transformations()
            .iter()
            .map(|t| TransformationDocument {
                name: t.name.clone(),
                requires: t.requires.clone(),
                sites: vec![TransformationSiteDocument {
                    name: t.site.clone(),
                    pfn: t.pfn.clone(),
                    kind: (if t.is_stageable { "stageable" } else { "installed" }).to_string(),
                    container: t.container.clone(),
                }],
                profiles: t.profiles.clone(),
            })
            .collect(),
        containers: tc
            .containers()
            .iter()
            .map(|c| ContainerDocument {
                name: c.name.clone(),
                kind: c.kind.clone(),
                image: c.image.clone(),
                profiles: c.profiles.clone(),
            })
            .collect(),
    }
}

/// Build the workflow document. Catalogs are embedded when given.
pub fn workflow_document(
    wf: &Workflow,
    dependencies: &[Dependency],
    rc: Option<&ReplicaCatalog>,
    tc: Option<&TransformationCatalog>,
) -> WorkflowDocument {
    let jobs = wf
        .jobs()
        .iter()
        .map(|job| JobDocument {
            kind: "job".to_string(),
            name: job.transformation().to_string(),
            id: job.id().unwrap_or_default().to_string(),
            arguments: job.arguments().to_vec(),
            uses: job
                .uses()
                .iter()
                .map(|u| match u.link {
                    Link::Input => UseDocument {
                        lfn: u.file.lfn().to_string(),
                        kind: "input".to_string(),
                        stage_out: None,
                        register_replica: None,
                    },
                    Link::Output => UseDocument {
                        lfn: u.file.lfn().to_string(),
                        kind: "output".to_string(),
                        stage_out: Some(u.stage_out),
                        register_replica: Some(u.register_replica),
                    },
                })
                .collect(),
        })
        .collect();

    WorkflowDocument {
        pegasus: PEGASUS_VERSION.to_string(),
        name: wf.name().to_string(),
        replica_catalog: rc.map(replica_catalog_document),
        transformation_catalog: tc.map(transformation_catalog_document),
        jobs,
        job_dependencies: dependencies
            .iter()
            .map(|d| DependencyDocument {
                id: d.parent.clone(),
                children: d.children.clone(),
            })
            .collect(),
    }
}

pub fn to_yaml<T: Serialize>(doc: &T) -> Result<String> {
    Ok(serde_yml::to_string(doc)?)
}
