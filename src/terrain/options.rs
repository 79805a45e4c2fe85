//! Generation options and the boundary policy that makes them safe to use.
//!
//! Options are plain data. [`TerrainOptions::sanitized`] is the single place where
//! out-of-range values are corrected: they are clamped or rounded, never rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noise::{Combiner, DistanceMetric};

/// Largest heightmap edge accepted by the generator.
pub const MAX_SIZE: u32 = 2048;

/// Errors that can occur while loading or saving option presets.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preset: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize preset: {0}")]
    Serialize(#[from] ron::Error),
}

/// Options shared by every stage of a generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalOptions {
    /// Edge length of the heightmap; a power of two after sanitizing.
    pub size: u32,
    /// Seed shared by the cloud and cellular generators.
    pub seed: i32,
    /// Weight of the cloud fractal in the blend.
    pub cloud_influence: f32,
    /// Weight of the cellular field in the blend.
    pub cellular_influence: f32,
    /// Vertical scale applied when heights leave the [0, 1] domain (e.g. RAW export).
    pub multiplier: f32,
    /// Run thermal erosion after blending.
    pub use_thermal_erosion: bool,
    /// Run hydraulic erosion after blending (and after thermal erosion, if enabled).
    pub use_hydraulic_erosion: bool,
    /// Mesh preview flag; carried through files untouched.
    pub show_seams: bool,
}

impl Default for NormalOptions {
    fn default() -> Self {
        Self {
            size: 256,
            seed: 0,
            cloud_influence: 0.67,
            cellular_influence: 0.33,
            multiplier: 1.0,
            use_thermal_erosion: false,
            use_hydraulic_erosion: false,
            show_seams: false,
        }
    }
}

/// Starting corner values of the cloud fractal, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudOptions {
    pub upper_left: f32,
    pub lower_left: f32,
    pub lower_right: f32,
    pub upper_right: f32,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            upper_left: 1.0,
            lower_left: 0.75,
            lower_right: 0.5,
            upper_right: 0.25,
        }
    }
}

impl CloudOptions {
    /// Corners in the order the fractal consumes them.
    pub fn corners(&self) -> [f32; 4] {
        [
            self.upper_left,
            self.lower_left,
            self.lower_right,
            self.upper_right,
        ]
    }

    pub fn from_corners(corners: [f32; 4]) -> Self {
        Self {
            upper_left: corners[0],
            lower_left: corners[1],
            lower_right: corners[2],
            upper_right: corners[3],
        }
    }
}

/// How feature points of the cellular field are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellularStrategy {
    /// Split the grid into `num_subregions` blocks and pick
    /// `feature_points_per_region` distinct cells in each.
    Subregion {
        feature_points_per_region: u32,
        num_subregions: u32,
    },
    /// Continuous Worley noise: a hashed, Poisson-populated point lattice sampled at
    /// `zoom` cells per unit.
    CubeHash { zoom: f32 },
}

impl Default for CellularStrategy {
    fn default() -> Self {
        CellularStrategy::Subregion {
            feature_points_per_region: 2,
            num_subregions: 4,
        }
    }
}

impl CellularStrategy {
    /// Default cube-hash strategy.
    pub fn cube_hash() -> Self {
        CellularStrategy::CubeHash { zoom: 5.0 }
    }

    /// Total number of feature points for the subregion strategy; `None` for cube-hash,
    /// whose point count is unbounded.
    pub fn feature_point_count(&self) -> Option<usize> {
        match *self {
            CellularStrategy::Subregion {
                feature_points_per_region,
                num_subregions,
            } => Some(feature_points_per_region as usize * num_subregions as usize),
            CellularStrategy::CubeHash { .. } => None,
        }
    }
}

/// Options of the cellular (Voronoi / Worley) generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularOptions {
    pub metric: DistanceMetric,
    pub combiner: Combiner,
    pub strategy: CellularStrategy,
    /// Scale applied to combined distances before clamping to [0, 1].
    pub multiplier: f32,
}

impl Default for CellularOptions {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default(),
            combiner: Combiner::default(),
            strategy: CellularStrategy::default(),
            multiplier: 5.0,
        }
    }
}

impl CellularOptions {
    /// Cube-hash options. Worley distances already span [0, 1] at the default zoom,
    /// so no extra scale is applied.
    pub fn worley() -> Self {
        Self {
            strategy: CellularStrategy::cube_hash(),
            multiplier: 1.0,
            ..Default::default()
        }
    }
}

/// The complete, immutable input of one generation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainOptions {
    pub normal: NormalOptions,
    pub cloud: CloudOptions,
    pub cellular: CellularOptions,
}

impl TerrainOptions {
    /// Loads a RON preset. Missing fields take their default values.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let data = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&data)?)
    }

    /// Writes the options as a pretty-printed RON preset.
    pub fn save(&self, path: &Path) -> Result<(), OptionsError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Returns a copy with every option group corrected to its valid range.
    pub fn sanitized(&self) -> Self {
        Self {
            normal: self.normal.sanitized(),
            cloud: self.cloud.sanitized(),
            cellular: self.cellular.sanitized(),
        }
    }
}

impl NormalOptions {
    /// Size rounded to a power of two, weights and multiplier clamped to finite values >= 0.
    pub fn sanitized(&self) -> Self {
        let size = closest_power_of_two(self.size);
        if size != self.size {
            log::warn!(
                "size {} is not a power of two in [1, {}], using {}",
                self.size,
                MAX_SIZE,
                size
            );
        }
        Self {
            size,
            cloud_influence: non_negative("cloud influence", self.cloud_influence),
            cellular_influence: non_negative("cellular influence", self.cellular_influence),
            multiplier: non_negative("multiplier", self.multiplier),
            ..self.clone()
        }
    }
}

impl CloudOptions {
    /// Every corner clamped to [0, 1]; NaN becomes 0.
    pub fn sanitized(&self) -> Self {
        let corners = self.corners().map(|c| {
            let fixed = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
            if fixed != c {
                log::warn!("cloud corner {} outside [0, 1], using {}", c, fixed);
            }
            fixed
        });
        Self::from_corners(corners)
    }
}

impl CellularOptions {
    /// Multiplier and zoom clamped to finite values >= 0.
    pub fn sanitized(&self) -> Self {
        let strategy = match self.strategy {
            CellularStrategy::CubeHash { zoom } => CellularStrategy::CubeHash {
                zoom: non_negative("zoom", zoom),
            },
            subregion => subregion,
        };
        Self {
            strategy,
            multiplier: non_negative("cellular multiplier", self.multiplier),
            ..*self
        }
    }
}

/// Clamps `size` to `[1, MAX_SIZE]` and rounds it to the closest power of two.
///
/// Ties round up, so 3 becomes 4 and 6 becomes 8.
pub fn closest_power_of_two(size: u32) -> u32 {
    let size = size.clamp(1, MAX_SIZE);
    if size.is_power_of_two() {
        return size;
    }
    let lower = 1u32 << (31 - size.leading_zeros());
    let upper = lower << 1;
    if size - lower < upper - size {
        lower
    } else {
        upper
    }
}

fn non_negative(name: &str, value: f32) -> f32 {
    if !value.is_finite() || value < 0.0 {
        log::warn!("{} {} is negative or not finite, using 0", name, value);
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let options = TerrainOptions::default();
        assert_eq!(options.normal.size, 256);
        assert_eq!(options.normal.cloud_influence, 0.67);
        assert_eq!(options.normal.cellular_influence, 0.33);
        assert_eq!(options.cloud.corners(), [1.0, 0.75, 0.5, 0.25]);
        assert_eq!(options.cellular.metric, DistanceMetric::SquaredEuclidean);
        assert_eq!(options.cellular.combiner, Combiner::D2MinusD1);
        assert_eq!(options.cellular.strategy.feature_point_count(), Some(8));
    }

    #[test]
    fn test_closest_power_of_two() {
        assert_eq!(closest_power_of_two(0), 1);
        assert_eq!(closest_power_of_two(1), 1);
        assert_eq!(closest_power_of_two(3), 4);
        assert_eq!(closest_power_of_two(5), 4);
        assert_eq!(closest_power_of_two(6), 8);
        assert_eq!(closest_power_of_two(300), 256);
        assert_eq!(closest_power_of_two(400), 512);
        assert_eq!(closest_power_of_two(5000), 2048);
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let options = TerrainOptions {
            normal: NormalOptions {
                size: 300,
                multiplier: f32::NAN,
                cloud_influence: -1.0,
                ..Default::default()
            },
            cloud: CloudOptions::from_corners([1.5, -0.5, f32::NAN, 0.5]),
            cellular: CellularOptions {
                strategy: CellularStrategy::CubeHash { zoom: -2.0 },
                multiplier: -3.0,
                ..Default::default()
            },
        };

        let fixed = options.sanitized();
        assert_eq!(fixed.normal.size, 256);
        assert_eq!(fixed.normal.multiplier, 0.0);
        assert_eq!(fixed.normal.cloud_influence, 0.0);
        assert_eq!(fixed.normal.cellular_influence, 0.33);
        assert_eq!(fixed.cloud.corners(), [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(fixed.cellular.strategy, CellularStrategy::CubeHash { zoom: 0.0 });
        assert_eq!(fixed.cellular.multiplier, 0.0);
    }

    #[test]
    fn test_sanitize_rejects_infinity() {
        let options = TerrainOptions {
            normal: NormalOptions {
                cloud_influence: f32::NEG_INFINITY,
                cellular_influence: f32::INFINITY,
                multiplier: f32::INFINITY,
                ..Default::default()
            },
            cellular: CellularOptions {
                strategy: CellularStrategy::CubeHash { zoom: f32::INFINITY },
                multiplier: f32::INFINITY,
                ..Default::default()
            },
            ..Default::default()
        };

        let fixed = options.sanitized();
        assert_eq!(fixed.normal.cloud_influence, 0.0);
        assert_eq!(fixed.normal.cellular_influence, 0.0);
        assert_eq!(fixed.normal.multiplier, 0.0);
        assert_eq!(fixed.cellular.strategy, CellularStrategy::CubeHash { zoom: 0.0 });
        assert_eq!(fixed.cellular.multiplier, 0.0);
    }

    #[test]
    fn test_sanitize_leaves_valid_options_alone() {
        let options = TerrainOptions::default();
        assert_eq!(options.sanitized(), options);
    }

    #[test]
    fn test_preset_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preset.ron");

        let mut options = TerrainOptions::default();
        options.normal.seed = 99;
        options.cellular.strategy = CellularStrategy::cube_hash();
        options.save(&path).unwrap();

        let loaded = TerrainOptions::load(&path).unwrap();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_partial_preset_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        std::fs::write(&path, "(normal: (size: 64, seed: 7))").unwrap();

        let loaded = TerrainOptions::load(&path).unwrap();
        assert_eq!(loaded.normal.size, 64);
        assert_eq!(loaded.normal.seed, 7);
        assert_eq!(loaded.normal.cloud_influence, 0.67);
        assert_eq!(loaded.cloud, CloudOptions::default());
    }

    #[test]
    fn test_missing_preset_is_io_error() {
        let dir = tempdir().unwrap();
        let result = TerrainOptions::load(&dir.path().join("nope.ron"));
        assert!(matches!(result, Err(OptionsError::Io(_))));
    }
}
