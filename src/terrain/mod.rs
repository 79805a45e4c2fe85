//! Heightmap data and generation options.

mod field;
mod options;

pub use field::ScalarField;
pub use options::{
    closest_power_of_two, CellularOptions, CellularStrategy, CloudOptions, NormalOptions,
    OptionsError, TerrainOptions, MAX_SIZE,
};
