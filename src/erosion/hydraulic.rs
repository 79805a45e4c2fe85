//! Grid hydraulic erosion using the virtual-pipes water model.
//!
//! Every step rains on the field, moves water along height-plus-water gradients,
//! erodes or deposits against a velocity-dependent sediment capacity, advects sediment
//! from the upstream neighbour and evaporates. Edges are closed: a cell on the border
//! uses itself as the missing neighbour, so no water leaves through the edge.

use crate::erosion::ErosionConfig;
use crate::terrain::ScalarField;

/// Fields produced by the hydraulic pass.
#[derive(Debug, Clone)]
pub struct HydraulicOutputs {
    pub heights: ScalarField,
    pub water: ScalarField,
    pub sediment: ScalarField,
    /// Net height delta per cell.
    pub deposition: ScalarField,
}

const EAST: usize = 0;
const WEST: usize = 1;
const NORTH: usize = 2;
const SOUTH: usize = 3;

/// Neighbour indices `(east, west, north, south)`, clamped at the edges.
#[inline]
fn neighbor_4(size: usize, i: usize) -> [usize; 4] {
    let x = i % size;
    let y = i / size;
    let east = if x + 1 < size { i + 1 } else { i };
    let west = if x > 0 { i - 1 } else { i };
    let north = if y + 1 < size { i + size } else { i };
    let south = if y > 0 { i - size } else { i };
    [east, west, north, south]
}

#[inline]
fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Runs `config.hydraulic_steps` hydraulic steps on a copy of `field`.
pub fn hydraulic_erosion(field: &ScalarField, config: &ErosionConfig) -> HydraulicOutputs {
    let size = field.size as usize;
    let total = field.len();

    let mut h = field.values.clone();
    let mut w = vec![0.0f32; total];
    let mut s = vec![0.0f32; total];
    let mut flux = vec![[0.0f32; 4]; total];

    let mut w_next = vec![0.0f32; total];
    let mut h_next = vec![0.0f32; total];
    let mut s_next = vec![0.0f32; total];
    let mut flux_next = vec![[0.0f32; 4]; total];

    let rainfall = config.rainfall;
    let evap = clamp01(config.evaporation);
    let ks = config.erosion_rate.max(0.0);
    let kd = config.deposition_rate.max(0.0);
    let kc = config.sediment_capacity.max(0.0);

    for _step in 0..config.hydraulic_steps {
        if rainfall != 0.0 {
            for wi in &mut w {
                *wi += rainfall;
            }
        }

        // Outflow fluxes, scaled so a cell never sends more water than it holds.
        for i in 0..total {
            let surface = h[i] + w[i];
            let mut f = neighbor_4(size, i).map(|n| (surface - (h[n] + w[n])).max(0.0));

            let sum: f32 = f.iter().sum();
            if sum > 1e-6 && sum > w[i] {
                let scale = w[i] / sum;
                for fi in &mut f {
                    *fi *= scale;
                }
            }
            flux_next[i] = f;
        }
        std::mem::swap(&mut flux, &mut flux_next);

        // Water update from flux divergence, then evaporation.
        for i in 0..total {
            let f = flux[i];
            let outflow: f32 = f.iter().sum();
            let [east, west, north, south] = neighbor_4(size, i);

            // A clamped edge neighbour is the cell itself, whose flux towards itself is 0.
            let inflow =
                flux[west][EAST] + flux[east][WEST] + flux[south][NORTH] + flux[north][SOUTH];

            let w1 = (w[i] + inflow - outflow).max(0.0);
            w_next[i] = w1 * (1.0 - evap);
        }
        std::mem::swap(&mut w, &mut w_next);

        // Erosion and deposition against the local carrying capacity.
        for i in 0..total {
            let surface = h[i] + w[i];
            let lowest = neighbor_4(size, i)
                .iter()
                .map(|&n| h[n] + w[n])
                .fold(f32::INFINITY, f32::min);
            let slope = (surface - lowest).max(0.0);

            let f = flux[i];
            let vx = f[EAST] - f[WEST];
            let vy = f[NORTH] - f[SOUTH];
            let vel = (vx * vx + vy * vy).sqrt();

            let capacity = kc * vel * slope;
            let (h0, s0) = (h[i], s[i]);

            let (h1, s1) = if s0 > capacity {
                let dep = kd * (s0 - capacity);
                (h0 + dep, s0 - dep)
            } else {
                let ero = ks * (capacity - s0);
                (h0 - ero, s0 + ero)
            };

            h_next[i] = h1;
            s_next[i] = s1;
        }
        std::mem::swap(&mut h, &mut h_next);
        std::mem::swap(&mut s, &mut s_next);

        // Sediment transport: gather from the upstream neighbour along the dominant axis.
        for i in 0..total {
            let f = flux[i];
            let vx = f[EAST] - f[WEST];
            let vy = f[NORTH] - f[SOUTH];
            let [east, west, north, south] = neighbor_4(size, i);

            let src = if vx.abs() > vy.abs() {
                if vx > 0.0 {
                    west
                } else if vx < 0.0 {
                    east
                } else {
                    i
                }
            } else if vy > 0.0 {
                south
            } else if vy < 0.0 {
                north
            } else {
                i
            };
            s_next[i] = s[src];
        }
        std::mem::swap(&mut s, &mut s_next);

        if evap != 0.0 {
            let factor = 1.0 - 0.25 * evap;
            for wi in &mut w {
                *wi = (*wi * factor).max(0.0);
            }
        }
    }

    let deposition = h.iter().zip(&field.values).map(|(h1, h0)| h1 - h0).collect();

    HydraulicOutputs {
        heights: ScalarField { size: field.size, values: h },
        water: ScalarField { size: field.size, values: w },
        sediment: ScalarField { size: field.size, values: s },
        deposition: ScalarField { size: field.size, values: deposition },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped(size: u32) -> ScalarField {
        let mut field = ScalarField::new(size);
        for (col, row) in field.cell_coords().collect::<Vec<_>>() {
            field.set(col, row, (col + row) as f32 / (2 * size) as f32);
        }
        field
    }

    #[test]
    fn test_water_non_negative() {
        let field = ScalarField::new(16);
        let config = ErosionConfig {
            hydraulic_steps: 10,
            ..Default::default()
        };
        let out = hydraulic_erosion(&field, &config);
        assert!(out.water.values.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_flat_field_keeps_its_height() {
        // No gradient means no flux, so nothing is eroded.
        let field = ScalarField::filled(8, 0.5);
        let out = hydraulic_erosion(&field, &ErosionConfig::default());
        assert_eq!(out.heights, field);
        assert!(out.deposition.values.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_deposition_matches_height_delta() {
        let field = sloped(16);
        let config = ErosionConfig {
            hydraulic_steps: 20,
            evaporation: 0.01,
            ..Default::default()
        };
        let out = hydraulic_erosion(&field, &config);
        let delta = out.heights.sum() - field.sum();
        assert!((delta - out.deposition.sum()).abs() < 1e-3);
        assert!(out.heights.is_finite());
    }

    #[test]
    fn test_slope_is_eroded() {
        let field = sloped(16);
        let out = hydraulic_erosion(&field, &ErosionConfig::default());
        assert_ne!(out.heights, field);
    }

    #[test]
    fn test_deterministic() {
        let field = sloped(8);
        let config = ErosionConfig::default();
        let a = hydraulic_erosion(&field, &config);
        let b = hydraulic_erosion(&field, &config);
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.sediment, b.sediment);
    }

    #[test]
    fn test_zero_steps_is_identity() {
        let field = sloped(4);
        let config = ErosionConfig {
            hydraulic_steps: 0,
            ..Default::default()
        };
        assert_eq!(hydraulic_erosion(&field, &config).heights, field);
    }
}
