//! Thermal erosion: material slides from a cell to lower neighbours whose height
//! difference exceeds the talus threshold.
//!
//! The sweep updates the field in place, in ascending row-major order, so cells later
//! in a sweep already see the transfers made by earlier ones. The output therefore
//! depends on sweep order and this pass is never parallelized.

use crate::erosion::ErosionConfig;
use crate::terrain::ScalarField;

/// Runs `iterations` thermal sweeps with the default talus and transfer fraction.
///
/// Works on a copy; `field` is left untouched.
pub fn thermal_erosion(field: &ScalarField, iterations: u32) -> ScalarField {
    let config = ErosionConfig {
        thermal_iterations: iterations,
        ..Default::default()
    };
    thermal_erosion_with_config(field, &config)
}

/// Runs `config.thermal_iterations` thermal sweeps on a copy of `field`.
pub fn thermal_erosion_with_config(field: &ScalarField, config: &ErosionConfig) -> ScalarField {
    let mut out = field.clone();
    if out.is_empty() {
        return out;
    }

    let size = out.size as usize;
    let talus = config.talus_factor / out.len() as f32;
    let c = config.transfer_fraction;
    let h = &mut out.values;

    for _ in 0..config.thermal_iterations {
        for j in 0..h.len() {
            let neighbors = neighbors_of(j, size);

            let mut diffs = [0.0f32; 4];
            let mut total_d = 0.0f32;
            for (slot, n) in neighbors.iter().enumerate() {
                let Some(n) = *n else { continue };
                let d = h[j] - h[n];
                diffs[slot] = d;
                if d > talus {
                    total_d += d;
                }
            }

            if total_d <= 0.0 {
                continue;
            }

            for (slot, n) in neighbors.iter().enumerate() {
                let Some(n) = *n else { continue };
                if diffs[slot] <= talus {
                    continue;
                }
                let to_move = c * diffs[slot] / total_d;
                h[n] += to_move;
                h[j] -= to_move;
            }
        }
    }

    out
}

/// Up, right, left, down. Edge cells have no neighbour across the edge; the right
/// and left neighbours never wrap onto the adjacent row.
#[inline]
fn neighbors_of(j: usize, size: usize) -> [Option<usize>; 4] {
    let row = j / size;
    let col = j % size;
    [
        (row > 0).then(|| j - size),
        (col + 1 < size).then(|| j + 1),
        (col > 0).then(|| j - 1),
        (row + 1 < size).then(|| j + size),
    ]
}
