//! Noise generators for heightmap synthesis.
//!
//! The cloud fractal gives the broad shape of the terrain; the cellular field adds
//! ridges and basins around scattered feature points.

mod cellular;
mod cloud;
mod metrics;
mod voronoi;
mod worley;

pub use cellular::{generate_cellular_field, CellularField};
pub use cloud::{generate_cloud_field, CloudFractal};
pub use metrics::{
    chebyshev, d1, d2_minus_d1, d3_minus_d1, euclidean, manhattan, squared_euclidean,
    Combiner, CombinerFn, DistanceFn, DistanceMetric,
};
pub use voronoi::{place_feature_points, region_grid, voronoi_field};
pub use worley::{feature_point_count, WorleyNoise};
