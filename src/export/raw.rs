//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::terrain::ScalarField;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Options for RAW export.
#[derive(Debug, Clone)]
pub struct RawExportOptions {
    /// RAW format to use.
    pub format: RawFormat,
    /// Vertical scale applied to every height before writing.
    pub multiplier: f32,
    /// Scaled height mapped to 0 (R16 formats only).
    pub min_height: f32,
    /// Scaled height mapped to 65535 (R16 formats only).
    pub max_height: f32,
}

impl Default for RawExportOptions {
    fn default() -> Self {
        Self {
            format: RawFormat::R16LittleEndian,
            multiplier: 1.0,
            min_height: 0.0,
            max_height: 1.0,
        }
    }
}

impl RawExportOptions {
    /// Options for heights in [0, 1] scaled by `multiplier`.
    ///
    /// The R16 range becomes `[0, multiplier]`, so scaled heights keep their full
    /// precision instead of saturating above 1.
    pub fn scaled(format: RawFormat, multiplier: f32) -> Self {
        Self {
            format,
            multiplier,
            min_height: 0.0,
            max_height: multiplier.max(f32::EPSILON),
        }
    }
}

/// Encodes a field as RAW samples in row-major order.
pub fn encode_raw(
    field: &ScalarField,
    options: &RawExportOptions,
) -> Result<Vec<u8>, RawExportError> {
    let mut out = Vec::with_capacity(expected_file_size(field.size, options.format) as usize);
    write_raw(field, &mut out, options)?;
    Ok(out)
}

/// Exports a field as a RAW heightmap file.
///
/// # Arguments
/// * `field` - The heightmap to export
/// * `path` - Output file path
/// * `options` - Format, vertical scale and normalization range
///
/// # Returns
/// `Ok(())` on success, or an error if export fails
pub fn export_field_raw(
    field: &ScalarField,
    path: &Path,
    options: &RawExportOptions,
) -> Result<(), RawExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_raw(field, &mut writer, options)?;
    writer.flush()?;
    log::info!("wrote {:?} heightmap {}", options.format, path.display());
    Ok(())
}

fn write_raw<W: Write>(
    field: &ScalarField,
    writer: &mut W,
    options: &RawExportOptions,
) -> Result<(), RawExportError> {
    let min_height = options.min_height;
    let max_height = options.max_height;
    if options.format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let range = max_height - min_height;
    let scaled = field.values.iter().map(|&h| h * options.multiplier);

    match options.format {
        RawFormat::R16LittleEndian => {
            for height in scaled {
                let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
                let value = (normalized * 65535.0) as u16;
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for height in scaled {
                let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
                let value = (normalized * 65535.0) as u16;
                writer.write_all(&value.to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for height in scaled {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    Ok(())
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(size: u32, format: RawFormat) -> u64 {
    (size as u64) * (size as u64) * format.bytes_per_sample()
}
