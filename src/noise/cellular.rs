//! Cellular field generation: picks the feature-point strategy and evaluates it.

use crate::noise::voronoi::{place_feature_points, voronoi_field};
use crate::noise::worley::WorleyNoise;
use crate::random::LcgRandom;
use crate::terrain::{CellularOptions, CellularStrategy, ScalarField};

/// A seeded cellular generator.
///
/// Metric and combiner are resolved to function pointers when the generator is built,
/// so rebuilding it is the way to change them.
#[derive(Debug, Clone)]
pub struct CellularField {
    size: u32,
    seed: u32,
    options: CellularOptions,
}

impl CellularField {
    pub fn new(size: u32, seed: u32, options: CellularOptions) -> Self {
        Self {
            size,
            seed,
            options,
        }
    }

    pub fn options(&self) -> &CellularOptions {
        &self.options
    }

    /// Generates a new field. Repeated calls return identical fields.
    pub fn generate(&self) -> ScalarField {
        generate_cellular_field(self.size, &self.options, self.seed)
    }
}

/// Generates a `size × size` cellular field for `options`, seeded with `seed`.
pub fn generate_cellular_field(size: u32, options: &CellularOptions, seed: u32) -> ScalarField {
    let distance = options.metric.resolve();
    let combiner = options.combiner.resolve();

    match options.strategy {
        CellularStrategy::Subregion {
            feature_points_per_region,
            num_subregions,
        } => {
            let mut rng = LcgRandom::new(seed);
            let points =
                place_feature_points(size, feature_points_per_region, num_subregions, &mut rng);
            log::debug!(
                "placed {} feature points in {} subregions",
                points.len(),
                num_subregions
            );
            voronoi_field(size, &points, distance, combiner, options.multiplier)
        }
        CellularStrategy::CubeHash { zoom } => {
            WorleyNoise::new(seed, distance, combiner).field(size, zoom, options.multiplier)
        }
    }
}
