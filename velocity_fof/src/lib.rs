// THEORY:
// This file is the main entry point for the `velocity_fof` library crate. It
// finds velocity-coherent clumps in a position-position-velocity cube with a
// two-stage friend-of-friend method.
//
// The public surface is the `FofPipeline` and its associated data structures
// (`FofConfig`, `ClumpReport`, `ClumpCatalog`, ...) in `pipeline`. The building
// blocks in `core_modules` are public as well so that individual stages can be
// driven and tested on their own.

pub mod core_modules;
pub mod pipeline;

pub use pipeline::{
    ClumpCatalog, ClumpReport, ClumpStatistics, Cube, FofConfig, FofError, FofPipeline,
    FofResult, GradientMode, PhysicalScale, Point, Sample, SampleId, find_clumps,
};
