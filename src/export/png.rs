//! PNG encoding of heightmaps.
//!
//! Two flavours: an 8-bit RGB preview (gray = height) that is also the image payload
//! of `.emb` files, and a 16-bit grayscale export with a configurable height range.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, ImageFormat, Luma, Rgb, RgbImage};
use thiserror::Error;

use crate::terrain::ScalarField;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("heightmap image must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },
}

/// Options for 16-bit PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height mapped to black.
    pub min_height: f32,
    /// Height mapped to white.
    pub max_height: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options spanning the field's own height range.
    pub fn auto_range(field: &ScalarField) -> Self {
        let (min, max) = field.value_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Quantizes a height to one 8-bit channel.
#[inline]
fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Renders the field as an RGB image with every channel equal to the height.
pub fn field_to_rgb_image(field: &ScalarField) -> RgbImage {
    ImageBuffer::from_fn(field.size, field.size, |x, y| {
        let c = to_channel(field.get(x, y));
        Rgb([c, c, c])
    })
}

/// Encodes the RGB preview of `field` as PNG bytes.
pub fn encode_rgb_png(field: &ScalarField) -> Result<Vec<u8>, PngExportError> {
    let img = field_to_rgb_image(field);
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    encoder.write_image(
        img.as_raw(),
        field.size,
        field.size,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Decodes a square PNG back into a field, reading heights from the red channel.
pub fn decode_png_to_field(bytes: &[u8]) -> Result<ScalarField, PngExportError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgb8();
    let (width, height) = img.dimensions();
    if width != height {
        return Err(PngExportError::NotSquare { width, height });
    }

    let values = img.pixels().map(|p| p[0] as f32 / 255.0).collect();
    Ok(ScalarField {
        size: width,
        values,
    })
}

/// Writes the RGB preview of `field` to `path`.
pub fn export_preview_png(field: &ScalarField, path: &Path) -> Result<(), PngExportError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new(writer);
    let img = field_to_rgb_image(field);
    encoder.write_image(
        img.as_raw(),
        field.size,
        field.size,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Exports a field as a 16-bit PNG heightmap.
///
/// # Arguments
/// * `field` - The heightmap to export
/// * `path` - Output file path
/// * `options` - Export options including height range for normalization
///
/// # Returns
/// `Ok(())` on success, or an error if export fails
pub fn export_field_png(
    field: &ScalarField,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let size = field.size;
    let range = max - min;

    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(size, size, |x, y| {
        let normalized = ((field.get(x, y) - min) / range).clamp(0.0, 1.0);
        Luma([(normalized * 65535.0) as u16])
    });

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // The encoder takes native-endian u16 samples as bytes.
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());

    encoder.write_image(byte_slice, size, size, image::ExtendedColorType::L16)?;

    log::info!("wrote 16-bit heightmap {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(size: u32) -> ScalarField {
        let mut field = ScalarField::new(size);
        for (x, y) in field.cell_coords().collect::<Vec<_>>() {
            field.set(x, y, (x + y) as f32 / (2 * (size - 1)) as f32);
        }
        field
    }

    #[test]
    fn test_preview_channels_are_gray() {
        let img = field_to_rgb_image(&gradient(4));
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(3, 3), &Rgb([255, 255, 255]));
        let p = img.get_pixel(1, 2);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let field = ScalarField::from_values(2, vec![-1.0, 2.0, 0.5, f32::NAN]).unwrap();
        let img = field_to_rgb_image(&field);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 255);
        assert_eq!(img.get_pixel(0, 1)[0], 128);
    }

    #[test]
    fn test_png_bytes_decode_to_quantized_field() {
        let field = gradient(16);
        let bytes = encode_rgb_png(&field).unwrap();
        let decoded = decode_png_to_field(&bytes).unwrap();

        assert_eq!(decoded.size, 16);
        for (a, b) in field.values.iter().zip(&decoded.values) {
            assert!((a - b).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_png_to_field(b"definitely not a png");
        assert!(matches!(result, Err(PngExportError::Image(_))));
    }

    #[test]
    fn test_decode_rejects_non_square() {
        let img = RgbImage::new(4, 2);
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), 4, 2, image::ExtendedColorType::Rgb8)
            .unwrap();
        let result = decode_png_to_field(&bytes);
        assert!(matches!(
            result,
            Err(PngExportError::NotSquare { width: 4, height: 2 })
        ));
    }

    #[test]
    fn test_export_field_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("height16.png");

        export_field_png(&gradient(32), &path, &PngExportOptions::default()).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(31, 31)[0], 65535);
    }

    #[test]
    fn test_export_preview_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preview.png");
        export_preview_png(&gradient(8), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_invalid_height_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let options = PngExportOptions {
            min_height: 1.0,
            max_height: -1.0,
            ..Default::default()
        };

        let result = export_field_png(&gradient(4), &path, &options);
        assert!(matches!(result, Err(PngExportError::InvalidHeightRange(..))));
    }

    #[test]
    fn test_auto_range() {
        let mut field = ScalarField::new(16);
        field.set(0, 0, -0.5);
        field.set(15, 15, 0.75);

        let options = PngExportOptions::auto_range(&field);
        assert_eq!(options.min_height, -0.5);
        assert_eq!(options.max_height, 0.75);
    }
}
