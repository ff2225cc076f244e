// src/pipeline/mod.rs

//! Builders that turn a mosaic request into jobs and replicas.
//!
//! - [`naming`]: every derived file name.
//! - [`request`]: center, size and band definitions.
//! - [`region`]: the nominal and oversized output grids.
//! - [`discovery`]: archive search per band.
//! - [`band`]: the per-band job chain.
//! - [`color`]: the optional three-color composite.
//!
//! All builders work on a [`GenerationContext`].

pub mod band;
pub mod color;
pub mod context;
pub mod discovery;
pub mod naming;
pub mod region;
pub mod request;

pub use band::{add_band, BandOutputs};
pub use color::{add_color_composite, color_jpg, ColorMap};
pub use context::GenerationContext;
pub use discovery::discover_images;
pub use region::{generate_region_hdr, RegionDescriptor, RegionFiles};
pub use request::{parse_bands, BandDefinition, BandSpec, Center, MosaicRequest};
