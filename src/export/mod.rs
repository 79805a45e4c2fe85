//! Export module for saving heightmaps to image and raw formats.
//!
//! Supports an 8-bit RGB preview (also the `.emb` image payload), 16-bit PNG for
//! precision, and RAW formats for game engine imports.

mod png;
mod raw;

pub use png::{
    decode_png_to_field, encode_rgb_png, export_field_png, export_preview_png,
    field_to_rgb_image, PngExportError, PngExportOptions,
};
pub use raw::{
    encode_raw, expected_file_size, export_field_raw, RawExportError, RawExportOptions,
    RawFormat,
};
