// src/catalog/mod.rs

//! Catalogs handed to the workflow engine alongside the jobs.
//!
//! - [`replica`]: where input files physically live.
//! - [`transformation`]: where executables live and how they are run.

pub mod replica;
pub mod transformation;

pub use replica::{Replica, ReplicaCatalog};
pub use transformation::{
    build_transformation_catalog, which, Container, Transformation, TransformationCatalog,
};
