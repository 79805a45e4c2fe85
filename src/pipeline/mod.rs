//! Heightmap generation pipeline.
//!
//! Runs the cloud and cellular generators, blends their fields and applies the
//! enabled erosion passes.

mod generator;

pub use generator::{blend, StageId, TerrainGenerator};
