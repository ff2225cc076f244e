// src/dag/job.rs

//! Jobs and the files they declare.
//!
//! A job never names another job. Ordering is derived later from the files:
//! a job that lists `x` as input runs after the job that lists `x` as output.

use std::fmt;

/// Logical file name (LFN).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File {
    lfn: String,
}

impl File {
    pub fn new(lfn: impl Into<String>) -> Self {
        Self { lfn: lfn.into() }
    }

    pub fn lfn(&self) -> &str {
        &self.lfn
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lfn)
    }
}

impl From<&str> for File {
    fn from(lfn: &str) -> Self {
        File::new(lfn)
    }
}

impl From<String> for File {
    fn from(lfn: String) -> Self {
        File::new(lfn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Input,
    Output,
}

/// One file declared by a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    pub file: File,
    pub link: Link,
    /// Outputs only: copy the file to the output site when the job is done.
    pub stage_out: bool,
    /// Outputs only: record the produced file in the replica catalog.
    /// Always set, staged or not.
    pub register_replica: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: Option<String>,
    transformation: String,
    args: Vec<String>,
    uses: Vec<Use>,
}

impl Job {
    pub fn new(transformation: impl Into<String>) -> Self {
        Self {
            id: None,
            transformation: transformation.into(),
            args: Vec::new(),
            uses: Vec::new(),
        }
    }

    pub fn add_inputs<'a, I>(&mut self, files: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a File>,
    {
        for file in files {
            self.push_use(file, Link::Input, false);
        }
        self
    }

    /// Declare outputs. `stage_out = false` marks them as intermediate.
    pub fn add_outputs<'a, I>(&mut self, files: I, stage_out: bool) -> &mut Self
    where
        I: IntoIterator<Item = &'a File>,
    {
        for file in files {
            self.push_use(file, Link::Output, stage_out);
        }
        self
    }

    /// Append one literal argument; files render as their LFN.
    pub fn arg(&mut self, arg: impl fmt::Display) -> &mut Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, A>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: fmt::Display,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    fn push_use(&mut self, file: &File, link: Link, stage_out: bool) {
        if self.uses.iter().any(|u| u.file == *file && u.link == link) {
            return;
        }
        self.uses.push(Use {
            file: file.clone(),
            link,
            stage_out,
            register_replica: true,
        });
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    /// Set once the job is added to a workflow.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn transformation(&self) -> &str {
        &self.transformation
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn inputs(&self) -> impl Iterator<Item = &File> {
        self.uses
            .iter()
            .filter(|u| u.link == Link::Input)
            .map(|u| &u.file)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Use> {
        self.uses.iter().filter(|u| u.link == Link::Output)
    }
}
