//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// Parameters of the erosion stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    /// Thermal erosion sweeps per generation pass.
    pub thermal_iterations: u32,
    /// Talus threshold numerator: a slope counts as steep when the height difference
    /// exceeds `talus_factor / cell_count`.
    pub talus_factor: f32,
    /// Share of the steep difference moved per transfer (`c`).
    pub transfer_fraction: f32,

    /// Number of hydraulic erosion timesteps.
    pub hydraulic_steps: u32,
    /// Rainfall per step (water units per cell per step).
    pub rainfall: f32,
    /// Evaporation factor per step (0-1).
    pub evaporation: f32,

    /// Erosion rate (Ks).
    pub erosion_rate: f32,
    /// Deposition rate (Kd).
    pub deposition_rate: f32,
    /// Sediment capacity factor (Kc).
    pub sediment_capacity: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            thermal_iterations: 3,
            talus_factor: 12.0,
            transfer_fraction: 0.5,

            hydraulic_steps: 50,
            rainfall: 0.01,
            evaporation: 0.02,

            erosion_rate: 0.02,
            deposition_rate: 0.02,
            sediment_capacity: 0.05,
        }
    }
}
