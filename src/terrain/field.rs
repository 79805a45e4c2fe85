//! Square scalar fields stored in row-major order.

use serde::{Deserialize, Serialize};

/// A `size × size` grid of `f32` values, row-major (`index = row * size + col`).
///
/// Every generator returns a fresh field; nothing is reused between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Width and height in cells.
    pub size: u32,
    /// Cell values, `size * size` of them.
    pub values: Vec<f32>,
}

impl ScalarField {
    /// Creates a field filled with `0.0`.
    pub fn new(size: u32) -> Self {
        Self::filled(size, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(size: u32, value: f32) -> Self {
        let len = (size as usize) * (size as usize);
        Self {
            size,
            values: vec![value; len],
        }
    }

    /// Wraps existing values. Returns `None` unless `values.len() == size * size`.
    pub fn from_values(size: u32, values: Vec<f32>) -> Option<Self> {
        if values.len() != (size as usize) * (size as usize) {
            return None;
        }
        Some(Self { size, values })
    }

    /// Flat index of `(col, row)`.
    #[inline]
    pub fn index_of(&self, col: u32, row: u32) -> usize {
        row as usize * self.size as usize + col as usize
    }

    /// Returns the value at `(col, row)`.
    ///
    /// # Panics
    /// Panics if `col` or `row` is out of bounds.
    pub fn get(&self, col: u32, row: u32) -> f32 {
        debug_assert!(col < self.size && row < self.size);
        self.values[self.index_of(col, row)]
    }

    /// Sets the value at `(col, row)`.
    ///
    /// # Panics
    /// Panics if `col` or `row` is out of bounds.
    pub fn set(&mut self, col: u32, row: u32, value: f32) {
        debug_assert!(col < self.size && row < self.size);
        let idx = self.index_of(col, row);
        self.values[idx] = value;
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `(min, max)`, or `(0.0, 0.0)` for an empty field.
    pub fn value_range(&self) -> (f32, f32) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        let min = self.values.iter().cloned().fold(f32::MAX, f32::min);
        let max = self.values.iter().cloned().fold(f32::MIN, f32::max);
        (min, max)
    }

    /// Sum of all cells.
    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// True if every value is finite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Returns a copy with every value multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> ScalarField {
        ScalarField {
            size: self.size,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// Iterates `(col, row)` in storage order.
    pub fn cell_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| (col, row)))
    }
}
