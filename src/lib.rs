//! Deterministic procedural terrain heightmaps.
//!
//! A heightmap is a weighted blend of a midpoint-displacement cloud fractal and a
//! cellular (Voronoi/Worley) distance field, optionally relaxed by thermal and
//! hydraulic erosion. Every generator is seeded explicitly, so the same options
//! always produce the same heightmap.

pub mod codec;
pub mod erosion;
pub mod export;
pub mod noise;
pub mod pipeline;
pub mod random;
pub mod terrain;

pub use codec::{CellularLayout, CodecError, HeightmapFile};
pub use erosion::ErosionConfig;
pub use noise::{CellularField, CloudFractal, Combiner, DistanceMetric, WorleyNoise};
pub use pipeline::{StageId, TerrainGenerator};
pub use random::LcgRandom;
pub use terrain::{
    CellularOptions, CellularStrategy, CloudOptions, NormalOptions, ScalarField, TerrainOptions,
};
