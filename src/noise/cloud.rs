//! Cloud fractal: recursive midpoint displacement over a square grid.
//!
//! Starting from four corner values, each level averages the corners into edge
//! midpoints and a displaced centre, then recurses into the four quadrants until a
//! quadrant is a single cell, which receives the average of its corners.

use serde::{Deserialize, Serialize};

use crate::random::LcgRandom;
use crate::terrain::ScalarField;

/// A seeded cloud fractal generator.
///
/// Every call to [`CloudFractal::generate`] starts from a fresh generator seeded with
/// `seed`, so repeated calls produce identical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFractal {
    pub size: u32,
    pub seed: u32,
    /// Upper-left, lower-left, lower-right, upper-right.
    pub corners: [f32; 4],
}

impl CloudFractal {
    pub fn new(size: u32, seed: u32, corners: [f32; 4]) -> Self {
        Self {
            size,
            seed,
            corners,
        }
    }

    /// Generates a new field.
    pub fn generate(&self) -> ScalarField {
        let mut rng = LcgRandom::new(self.seed);
        generate_cloud_field(self.size, self.corners, &mut rng)
    }
}

/// Generates a cloud fractal of `size × size` cells.
///
/// `size` should be a power of two; other sizes still produce a field but leave some
/// cells at `0.0`. Exactly one percentage is drawn from `rng` per subdivision step.
///
/// # Arguments
/// * `size` - Edge length of the field
/// * `corners` - Upper-left, lower-left, lower-right and upper-right start values
/// * `rng` - Source of the displacement draws
pub fn generate_cloud_field(size: u32, corners: [f32; 4], rng: &mut LcgRandom) -> ScalarField {
    let mut field = ScalarField::new(size);
    if size == 0 {
        return field;
    }

    let mut builder = Subdivider {
        size,
        values: &mut field.values,
        rng,
    };
    let [c1, c2, c3, c4] = corners;
    builder.subdivide(0, 0, size, size, c1, c2, c3, c4);
    field
}

struct Subdivider<'a> {
    size: u32,
    values: &'a mut [f32],
    rng: &'a mut LcgRandom,
}

impl Subdivider<'_> {
    #[allow(clippy::too_many_arguments)]
    fn subdivide(&mut self, x: u32, y: u32, w: u32, h: u32, c1: f32, c2: f32, c3: f32, c4: f32) {
        if w <= 1 && h <= 1 {
            let idx = y as usize * self.size as usize + x as usize;
            self.values[idx] = (c1 + c2 + c3 + c4) / 4.0;
            return;
        }

        let nw = w >> 1;
        let nh = h >> 1;

        let m = ((c1 + c2 + c3 + c4) / 4.0 + self.displace(nw + nh)).clamp(0.0, 1.0);
        let e1 = (c1 + c2) / 2.0;
        let e2 = (c2 + c3) / 2.0;
        let e3 = (c3 + c4) / 2.0;
        let e4 = (c4 + c1) / 2.0;

        self.subdivide(x, y, nw, nh, c1, e1, m, e4);
        self.subdivide(x + nw, y, nw, nh, e1, c2, e2, m);
        self.subdivide(x + nw, y + nh, nw, nh, m, e2, c3, e3);
        self.subdivide(x, y + nh, nw, nh, e4, m, e3, c4);
    }

    /// Random offset whose amplitude shrinks with the quadrant.
    fn displace(&mut self, half_extents: u32) -> f32 {
        let max = half_extents as f32 / (2.0 * self.size as f32) * 3.0;
        max * (self.rng.next_percent() - 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNERS: [f32; 4] = [1.0, 0.75, 0.5, 0.25];

    #[test]
    fn test_reproducibility() {
        let cloud = CloudFractal::new(64, 42, CORNERS);
        let a = cloud.generate();
        let b = cloud.generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = CloudFractal::new(32, 1, CORNERS).generate();
        let b = CloudFractal::new(32, 2, CORNERS).generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_values_in_unit_range() {
        for seed in [0, 7, 42, 1234] {
            let field = CloudFractal::new(128, seed, CORNERS).generate();
            assert_eq!(field.len(), 128 * 128);
            assert!(
                field.values.iter().all(|&v| (0.0..=1.0).contains(&v)),
                "seed {} produced a value outside [0, 1]",
                seed
            );
        }
    }

    #[test]
    fn test_single_cell_is_corner_average() {
        let field = CloudFractal::new(1, 42, [0.2, 0.4, 0.6, 1.0]).generate();
        assert_eq!(field.values, vec![(0.2 + 0.4 + 0.6 + 1.0) / 4.0]);
    }

    #[test]
    fn test_two_by_two_quadrants() {
        let [c1, c2, c3, c4] = CORNERS;
        let field = CloudFractal::new(2, 42, CORNERS).generate();

        // One subdivision step draws exactly one percentage.
        let mut replay = LcgRandom::new(42);
        let pct = replay.next_percent();
        let displacement = (2.0f32 / 4.0 * 3.0) * (pct - 0.5);
        let m = ((c1 + c2 + c3 + c4) / 4.0 + displacement).clamp(0.0, 1.0);
        let e1 = (c1 + c2) / 2.0;
        let e2 = (c2 + c3) / 2.0;
        let e3 = (c3 + c4) / 2.0;
        let e4 = (c4 + c1) / 2.0;

        assert_eq!(field.values.len(), 4);
        assert_eq!(field.get(0, 0), (c1 + e1 + m + e4) / 4.0);
        assert_eq!(field.get(1, 0), (e1 + c2 + e2 + m) / 4.0);
        assert_eq!(field.get(1, 1), (m + e2 + c3 + e3) / 4.0);
        assert_eq!(field.get(0, 1), (e4 + m + e3 + c4) / 4.0);
    }

    #[test]
    fn test_draw_count_matches_subdivisions() {
        // A 4x4 field subdivides once at the top and once per 2x2 quadrant.
        let mut rng = LcgRandom::new(9);
        generate_cloud_field(4, CORNERS, &mut rng);

        let mut expected = LcgRandom::new(9);
        for _ in 0..5 {
            expected.next_u32();
        }
        assert_eq!(rng.last(), expected.last());
    }

    #[test]
    fn test_zero_size_is_empty() {
        let field = CloudFractal::new(0, 1, CORNERS).generate();
        assert!(field.is_empty());
    }
}
