// src/dag/workflow.rs

use super::job::Job;

/// Ordered collection of jobs. Registration order matters: dependency
/// inference only links a consumer to producers registered before it.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    jobs: Vec<Job>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
        }
    }

    /// Add a job, assigning the next sequential id (`ID0000001`, ...).
    pub fn add_job(&mut self, mut job: Job) -> String {
        let id = format!("ID{:07}", self.jobs.len() + 1);
        job.assign_id(id.clone());
        self.jobs.push(job);
        id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of jobs running the given transformation.
    pub fn count_of(&self, transformation: &str) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.transformation() == transformation)
            .count()
    }
}
