//! Worley (cellular) noise over a hashed lattice of unit cubes.
//!
//! Each integer cube owns a reproducible set of feature points: its coordinates are
//! hashed into a seed, the first draw picks a Poisson-distributed point count and the
//! following draws place the points. A sample only needs the 27 cubes around it to
//! find its nearest points, so the field is unbounded and needs no precomputation.

use glam::Vec3;
use rayon::prelude::*;

use crate::noise::metrics::{CombinerFn, DistanceFn};
use crate::noise::voronoi::insert_sorted;
use crate::random::{fnv_hash3, LcgRandom};
use crate::terrain::ScalarField;

/// Initial value of the nearest-distance slots.
const FAR_AWAY: f32 = 9999.9;

/// `CDF(Poisson(4), k) * 2^32` for `k = 1..=8`.
const POISSON_CDF: [u32; 8] = [
    393_325_350,
    1_022_645_910,
    1_861_739_990,
    2_700_834_071,
    3_372_109_335,
    3_819_626_178,
    4_075_350_088,
    4_203_212_043,
];

/// Worley noise sampler.
#[derive(Debug, Clone, Copy)]
pub struct WorleyNoise {
    pub seed: u32,
    pub distance: DistanceFn,
    pub combiner: CombinerFn,
}

impl WorleyNoise {
    pub fn new(seed: u32, distance: DistanceFn, combiner: CombinerFn) -> Self {
        Self {
            seed,
            distance,
            combiner,
        }
    }

    /// Raw (unclamped) noise value at `pos`.
    pub fn sample(&self, pos: Vec3) -> f32 {
        let mut rng = LcgRandom::default();
        let mut nearest = [FAR_AWAY; 3];

        let eval_cube = pos.floor();
        let (ex, ey, ez) = (eval_cube.x as i32, eval_cube.y as i32, eval_cube.z as i32);

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let cube_x = ex.wrapping_add(i);
                    let cube_y = ey.wrapping_add(j);
                    let cube_z = ez.wrapping_add(k);

                    let hash = fnv_hash3(
                        (cube_x as u32).wrapping_add(self.seed),
                        cube_y as u32,
                        cube_z as u32,
                    );
                    let count = feature_point_count(rng.next_with_seed(hash));
                    let cube = Vec3::new(cube_x as f32, cube_y as f32, cube_z as f32);

                    for _ in 0..count {
                        let offset = Vec3::new(
                            unit_draw(&mut rng),
                            unit_draw(&mut rng),
                            unit_draw(&mut rng),
                        );
                        insert_sorted(&mut nearest, (self.distance)(pos, cube + offset));
                    }
                }
            }
        }

        (self.combiner)(&nearest)
    }

    /// Fills a `size × size` field, sampling cell `(col, row)` at
    /// `(col / size, row / size, 0) * zoom`. Values are scaled by `multiplier` and
    /// clamped to [0, 1].
    pub fn field(&self, size: u32, zoom: f32, multiplier: f32) -> ScalarField {
        let mut field = ScalarField::new(size);
        if size == 0 {
            return field;
        }

        field
            .values
            .par_chunks_mut(size as usize)
            .enumerate()
            .for_each(|(row, out)| {
                for (col, value) in out.iter_mut().enumerate() {
                    let pos = Vec3::new(col as f32 / size as f32, row as f32 / size as f32, 0.0)
                        * zoom;
                    *value = (self.sample(pos) * multiplier).clamp(0.0, 1.0);
                }
            });

        field
    }
}

/// Number of feature points in a cube for a uniformly distributed draw, in `1..=9`.
pub fn feature_point_count(draw: u32) -> u32 {
    POISSON_CDF
        .iter()
        .position(|&threshold| draw < threshold)
        .map_or(9, |i| i as u32 + 1)
}

#[inline]
fn unit_draw(rng: &mut LcgRandom) -> f32 {
    rng.next_u32() as f32 / 4_294_967_296.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{Combiner, DistanceMetric};

    fn noise(seed: u32) -> WorleyNoise {
        WorleyNoise::new(
            seed,
            DistanceMetric::SquaredEuclidean.resolve(),
            Combiner::D2MinusD1.resolve(),
        )
    }

    #[test]
    fn test_poisson_lookup_bounds() {
        assert_eq!(feature_point_count(0), 1);
        assert_eq!(feature_point_count(393_325_349), 1);
        assert_eq!(feature_point_count(393_325_350), 2);
        assert_eq!(feature_point_count(2_700_834_070), 4);
        assert_eq!(feature_point_count(4_203_212_042), 8);
        assert_eq!(feature_point_count(u32::MAX), 9);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let pos = Vec3::new(1.25, 3.5, 0.0);
        assert_eq!(noise(5).sample(pos), noise(5).sample(pos));
    }

    #[test]
    fn test_field_reproducible_and_clamped() {
        let a = noise(42).field(32, 5.0, 1.0);
        let b = noise(42).field(32, 5.0, 1.0);
        assert_eq!(a, b);
        assert!(a.values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_seed_changes_field() {
        let a = noise(1).field(16, 4.0, 1.0);
        let b = noise(2).field(16, 4.0, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_d1_is_non_negative_and_small() {
        // 27 cubes hold at least 27 points, so the nearest one is within the sample's
        // own cube neighbourhood.
        let worley = WorleyNoise::new(
            9,
            DistanceMetric::Euclidean.resolve(),
            Combiner::D1.resolve(),
        );
        for x in 0..10 {
            let d = worley.sample(Vec3::new(x as f32 * 0.37, 0.8, 0.0));
            assert!(d >= 0.0 && d < 2.0, "nearest distance {} out of range", d);
        }
    }
}
