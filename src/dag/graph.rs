// src/dag/graph.rs

//! Dependency inference from declared files.
//!
//! Edge direction: producer -> consumer. For every input of a job we look
//! up the job that declared it as output; if none did, the file must come
//! from the replica catalog.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::catalog::ReplicaCatalog;
use crate::errors::{Result, WorkflowError};

use super::workflow::Workflow;

/// Parent job and the jobs that consume its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub parent: String,
    pub children: Vec<String>,
}

/// Infer job-to-job edges and check that the graph is well formed.
///
/// Fails with [`WorkflowError::UnresolvedInput`] if a job consumes a file
/// that no earlier job produces and no replica provides, and with
/// [`WorkflowError::DagCycle`] if the edges form a cycle.
pub fn infer_dependencies(wf: &Workflow, replicas: &ReplicaCatalog) -> Result<Vec<Dependency>> {
    let jobs = wf.jobs();
    let mut producers: HashMap<&str, usize> = HashMap::new();
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    for (idx, job) in jobs.iter().enumerate() {
        graph.add_node(idx);

        for input in job.inputs() {
            match producers.get(input.lfn()) {
                Some(&producer) => {
                    graph.add_edge(producer, idx, ());
                }
                None if replicas.contains(input.lfn()) => {}
                None => {
                    return Err(WorkflowError::UnresolvedInput {
                        job: job_label(wf, idx),
                        lfn: input.lfn().to_string(),
                    });
                }
            }
        }

        for output in job.outputs() {
            let lfn = output.file.lfn();
            if let Some(&first) = producers.get(lfn) {
                warn!(
                    lfn,
                    first = %job_label(wf, first),
                    second = %job_label(wf, idx),
                    "file is produced by more than one job; keeping the first producer"
                );
                continue;
            }
            producers.insert(lfn, idx);
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        WorkflowError::DagCycle(format!(
            "cycle detected in job graph involving job {}",
            job_label(wf, cycle.node_id())
        ))
    })?;
    debug!(jobs = order.len(), edges = graph.edge_count(), "job graph is acyclic");

    let mut dependencies = Vec::new();
    for idx in 0..jobs.len() {
        let children: BTreeSet<usize> = graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        if children.is_empty() {
            continue;
        }
        dependencies.push(Dependency {
            parent: job_id(wf, idx),
            children: children.into_iter().map(|c| job_id(wf, c)).collect(),
        });
    }

    Ok(dependencies)
}

fn job_id(wf: &Workflow, idx: usize) -> String {
    wf.jobs()[idx]
        .id()
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", idx + 1))
}

fn job_label(wf: &Workflow, idx: usize) -> String {
    format!("{} ({})", job_id(wf, idx), wf.jobs()[idx].transformation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{File, Job};

    fn chain() -> (Workflow, ReplicaCatalog) {
        let raw = File::new("a.fits");
        let projected = File::new("pa.fits");
        let mosaic = File::new("mosaic.fits");

        let mut rc = ReplicaCatalog::new();
        rc.add_replica("ipac", "a.fits", "http://archive/a.fits");

        let mut wf = Workflow::new("montage");
        let mut project = Job::new("mProject");
        project.add_inputs([&raw]).add_outputs([&projected], false);
        wf.add_job(project);

        let mut add = Job::new("mAdd");
        add.add_inputs([&projected]).add_outputs([&mosaic], true);
        wf.add_job(add);

        let mut jpeg = Job::new("mJPEG");
        jpeg.add_inputs([&mosaic, &projected]);
        wf.add_job(jpeg);

        (wf, rc)
    }

    #[test]
    fn edges_follow_shared_files() {
        let (wf, rc) = chain();
        let deps = infer_dependencies(&wf, &rc).unwrap();

        assert_eq!(
            deps,
            vec![
                Dependency {
                    parent: "ID0000001".into(),
                    children: vec!["ID0000002".into(), "ID0000003".into()],
                },
                Dependency {
                    parent: "ID0000002".into(),
                    children: vec!["ID0000003".into()],
                },
            ]
        );
    }

    #[test]
    fn unknown_input_is_a_structural_error() {
        let (mut wf, rc) = chain();
        let mut orphan = Job::new("mBackground");
        orphan.add_inputs([&File::new("pnever.fits")]);
        wf.add_job(orphan);

        match infer_dependencies(&wf, &rc) {
            Err(WorkflowError::UnresolvedInput { job, lfn }) => {
                assert!(job.contains("ID0000004"));
                assert_eq!(lfn, "pnever.fits");
            }
            other => panic!("expected UnresolvedInput, got {other:?}"),
        }
    }

    #[test]
    fn consumer_registered_before_producer_is_rejected() {
        let mut wf = Workflow::new("montage");
        let late = File::new("late.txt");

        let mut consumer = Job::new("mConcatFit");
        consumer.add_inputs([&late]);
        wf.add_job(consumer);

        let mut producer = Job::new("mDiffFit");
        producer.add_outputs([&late], false);
        wf.add_job(producer);

        assert!(matches!(
            infer_dependencies(&wf, &ReplicaCatalog::new()),
            Err(WorkflowError::UnresolvedInput { .. })
        ));
    }
}
