//! Erosion passes applied to the blended heightmap.
//!
//! Thermal erosion relaxes slopes steeper than a talus threshold. Hydraulic erosion
//! rains on the field and lets water carry sediment downhill.

mod config;
mod hydraulic;
mod thermal;

pub use config::ErosionConfig;
pub use hydraulic::{hydraulic_erosion, HydraulicOutputs};
pub use thermal::{thermal_erosion, thermal_erosion_with_config};
