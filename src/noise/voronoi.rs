//! Voronoi diagram from feature points scattered over grid subregions.
//!
//! The grid is cut into a `regions_high × regions_wide` block layout. Each block gets
//! its own set of distinct feature cells, so points cannot all clump in one corner.
//! Every cell then measures its distance to the feature points and combines the
//! nearest few into a value.

use std::collections::HashSet;

use glam::Vec3;
use rayon::prelude::*;

use crate::noise::metrics::{CombinerFn, DistanceFn};
use crate::random::LcgRandom;
use crate::terrain::ScalarField;

/// Only the three nearest distances are ever read by a combiner.
const NEAREST: usize = 3;

/// Draw attempts per feature point before falling back to a scan for a free cell.
const MAX_ATTEMPTS_PER_POINT: u32 = 64;

/// Splits `num_subregions` into `(regions_high, regions_wide)`.
///
/// `regions_wide` is the largest divisor of `num_subregions` not above its square
/// root, so the layout is as close to square as the count allows. Returns `None` for
/// zero regions.
pub fn region_grid(num_subregions: u32) -> Option<(u32, u32)> {
    if num_subregions == 0 {
        return None;
    }
    let mut wide = (num_subregions as f64).sqrt() as u32;
    while wide > 1 && num_subregions % wide != 0 {
        wide -= 1;
    }
    let wide = wide.max(1);
    Some((num_subregions / wide, wide))
}

/// Picks feature cells for every subregion of a `size × size` grid.
///
/// Regions are visited in row-major order. Each receives up to
/// `points_per_region` distinct flat indices from inside its own row and column
/// bounds (fewer if the region has fewer cells; none if it is empty).
pub fn place_feature_points(
    size: u32,
    points_per_region: u32,
    num_subregions: u32,
    rng: &mut LcgRandom,
) -> Vec<usize> {
    let cells = size as u64 * size as u64;
    let regions = (num_subregions as u64).min(cells) as u32;
    let Some((regions_high, regions_wide)) = region_grid(regions) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    for region_row in 0..regions_high {
        let (row_min, rows) = span(region_row, regions_high, size);
        for region_col in 0..regions_wide {
            let (col_min, cols) = span(region_col, regions_wide, size);
            if rows == 0 || cols == 0 {
                continue;
            }

            let capacity = rows as u64 * cols as u64;
            let count = (points_per_region as u64).min(capacity) as usize;
            let mut taken = HashSet::with_capacity(count);

            while taken.len() < count {
                let mut placed = false;
                for _ in 0..MAX_ATTEMPTS_PER_POINT {
                    let row = row_min + scaled_draw(rng, rows);
                    let col = col_min + scaled_draw(rng, cols);
                    let idx = row as usize * size as usize + col as usize;
                    if taken.insert(idx) {
                        points.push(idx);
                        placed = true;
                        break;
                    }
                }
                if !placed {
                    // Region nearly full: take the first free cell in scan order.
                    let free = (0..rows)
                        .flat_map(|r| (0..cols).map(move |c| (row_min + r, col_min + c)))
                        .map(|(r, c)| r as usize * size as usize + c as usize)
                        .find(|idx| !taken.contains(idx));
                    match free {
                        Some(idx) => {
                            taken.insert(idx);
                            points.push(idx);
                        }
                        None => break,
                    }
                }
            }
        }
    }
    points
}

/// Generates a Voronoi field from explicit feature cells.
///
/// Each cell's value is `combiner(nearest distances) * multiplier`, clamped to
/// [0, 1]. Rows are evaluated in parallel; the result does not depend on scheduling.
pub fn voronoi_field(
    size: u32,
    feature_points: &[usize],
    distance: DistanceFn,
    combiner: CombinerFn,
    multiplier: f32,
) -> ScalarField {
    let mut field = ScalarField::new(size);
    if size == 0 {
        return field;
    }

    let inv = 1.0 / size as f32;
    let features: Vec<Vec3> = feature_points
        .iter()
        .map(|&idx| {
            let col = (idx % size as usize) as f32;
            let row = (idx / size as usize) as f32;
            Vec3::new(col * inv, row * inv, 0.0)
        })
        .collect();

    field
        .values
        .par_chunks_mut(size as usize)
        .enumerate()
        .for_each(|(row, out)| {
            let y = row as f32 * inv;
            for (col, value) in out.iter_mut().enumerate() {
                let sample = Vec3::new(col as f32 * inv, y, 0.0);

                let mut nearest = [f32::INFINITY; NEAREST];
                for feature in &features {
                    insert_sorted(&mut nearest, distance(*feature, sample));
                }
                let found = features.len().min(NEAREST);

                *value = (combiner(&nearest[..found]) * multiplier).clamp(0.0, 1.0);
            }
        });

    field
}

/// Start and length of block `index` when `extent` cells are split into `blocks`.
fn span(index: u32, blocks: u32, extent: u32) -> (u32, u32) {
    let start = (index as u64 * extent as u64 / blocks as u64) as u32;
    let end = ((index as u64 + 1) * extent as u64 / blocks as u64) as u32;
    (start, end - start)
}

/// Maps a draw onto `[0, n)` using its high bits; the low bits of a power-of-two LCG
/// have very short periods.
#[inline]
fn scaled_draw(rng: &mut LcgRandom, n: u32) -> u32 {
    ((rng.next_u32() as u64 * n as u64) >> 32) as u32
}

/// Inserts `x` into an ascending buffer, dropping the largest entry.
#[inline]
pub(crate) fn insert_sorted(buf: &mut [f32], x: f32) {
    for i in (0..buf.len()).rev() {
        if x > buf[i] {
            break;
        }
        let displaced = buf[i];
        buf[i] = x;
        if i + 1 < buf.len() {
            buf[i + 1] = displaced;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{Combiner, DistanceMetric};

    #[test]
    fn test_region_grid() {
        assert_eq!(region_grid(0), None);
        assert_eq!(region_grid(1), Some((1, 1)));
        assert_eq!(region_grid(4), Some((2, 2)));
        assert_eq!(region_grid(6), Some((3, 2)));
        assert_eq!(region_grid(7), Some((7, 1)));
        assert_eq!(region_grid(12), Some((4, 3)));
    }

    #[test]
    fn test_points_stay_inside_their_region() {
        let size = 16;
        let mut rng = LcgRandom::new(42);
        let points = place_feature_points(size, 3, 4, &mut rng);
        assert_eq!(points.len(), 12);

        // 2x2 layout of 8x8 blocks, visited row-major: 3 points per block.
        for (i, &idx) in points.iter().enumerate() {
            let region = i / 3;
            let (region_row, region_col) = (region / 2, region % 2);
            let row = idx / size as usize;
            let col = idx % size as usize;
            assert_eq!(row / 8, region_row, "point {} row {} outside region", i, row);
            assert_eq!(col / 8, region_col, "point {} col {} outside region", i, col);
        }
    }

    #[test]
    fn test_points_are_distinct_within_region() {
        let mut rng = LcgRandom::new(7);
        let points = place_feature_points(4, 4, 4, &mut rng);
        // Each 2x2 region is filled completely.
        let mut sorted = points.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 16);
    }

    #[test]
    fn test_points_capped_by_region_capacity() {
        let mut rng = LcgRandom::new(1);
        let points = place_feature_points(2, 10, 1, &mut rng);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_full_region_fills_every_cell() {
        let mut rng = LcgRandom::new(11);
        let points = place_feature_points(64, 4096, 1, &mut rng);
        assert_eq!(points.len(), 4096);
        let distinct: HashSet<usize> = points.iter().copied().collect();
        assert_eq!(distinct.len(), 4096);
    }

    #[test]
    fn test_more_regions_than_cells() {
        let mut rng = LcgRandom::new(3);
        let points = place_feature_points(2, 1, 1000, &mut rng);
        assert!(points.len() <= 4);
        assert!(points.iter().all(|&idx| idx < 4));
    }

    #[test]
    fn test_no_feature_points_gives_zero_field() {
        let field = voronoi_field(
            8,
            &[],
            DistanceMetric::Euclidean.resolve(),
            Combiner::D2MinusD1.resolve(),
            5.0,
        );
        assert!(field.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_d1_is_zero_on_feature_points() {
        let size = 8;
        let points = [9usize, 45];
        let field = voronoi_field(
            size,
            &points,
            DistanceMetric::Euclidean.resolve(),
            Combiner::D1.resolve(),
            1.0,
        );
        assert_eq!(field.values[9], 0.0);
        assert_eq!(field.values[45], 0.0);
        assert!(field.values[0] > 0.0);
    }

    #[test]
    fn test_single_point_with_d2_falls_back() {
        let field = voronoi_field(
            4,
            &[5],
            DistanceMetric::Manhattan.resolve(),
            Combiner::D2MinusD1.resolve(),
            1.0,
        );
        assert!(field.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_insert_sorted_keeps_smallest() {
        let mut buf = [f32::INFINITY; 3];
        for x in [0.5, 0.1, 0.9, 0.3, 0.05] {
            insert_sorted(&mut buf, x);
        }
        assert_eq!(buf, [0.05, 0.1, 0.3]);
    }
}
