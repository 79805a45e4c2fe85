//! `.emb` heightmap files: generation parameters followed by an optional PNG.
//!
//! All numbers are little-endian. The header is
//!
//! ```text
//! i32 size | i32 seed | f32 multiplier | f32 cloud influence | f32 cellular influence
//! u8  show seams
//! f32 upper left | f32 lower left | f32 lower right | f32 upper right
//! i32 metric tag | i32 combiner tag
//! cellular parameters (see CellularLayout)
//! ```
//!
//! and every remaining byte is the image payload. The cellular block is not
//! self-describing, so readers must be told which layout to expect.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::export::{decode_png_to_field, PngExportError};
use crate::noise::{Combiner, DistanceMetric};
use crate::terrain::{
    CellularOptions, CellularStrategy, CloudOptions, NormalOptions, ScalarField,
    TerrainOptions,
};

/// Errors raised while reading or writing `.emb` files.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file ends before field `{field}`")]
    Truncated { field: &'static str },
    #[error("embedded image: {0}")]
    Image(#[from] PngExportError),
}

/// Layout of the cellular parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellularLayout {
    /// `i32 feature points per region | i32 subregions`. The multiplier is not stored
    /// and reads back as the default.
    Subregion,
    /// `i32 feature points per region | i32 subregions | f32 multiplier`.
    SubregionScaled,
    /// `f32 zoom`. The multiplier is not stored and reads back as 1.
    CubeHash,
}

impl CellularLayout {
    /// Layout used when writing `options`.
    pub fn for_options(options: &CellularOptions) -> Self {
        match options.strategy {
            CellularStrategy::Subregion { .. } => CellularLayout::SubregionScaled,
            CellularStrategy::CubeHash { .. } => CellularLayout::CubeHash,
        }
    }
}

/// Decoded contents of an `.emb` file.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapFile {
    pub options: TerrainOptions,
    /// PNG payload, if the file carried one.
    pub image: Option<Vec<u8>>,
}

impl HeightmapFile {
    /// Decodes the image payload into a field (heights from the red channel).
    pub fn decode_image(&self) -> Result<Option<ScalarField>, CodecError> {
        match &self.image {
            Some(bytes) => Ok(Some(decode_png_to_field(bytes)?)),
            None => Ok(None),
        }
    }
}

/// Serializes options and an optional PNG payload.
pub fn encode(options: &TerrainOptions, image: Option<&[u8]>) -> Vec<u8> {
    let layout = CellularLayout::for_options(&options.cellular);
    encode_with_layout(options, image, layout)
}

/// Serializes options with an explicit cellular layout.
///
/// Strategy parameters that the layout cannot hold are written as zero.
pub fn encode_with_layout(
    options: &TerrainOptions,
    image: Option<&[u8]>,
    layout: CellularLayout,
) -> Vec<u8> {
    let normal = &options.normal;
    let cloud = &options.cloud;
    let cellular = &options.cellular;

    let mut out = Vec::with_capacity(64 + image.map_or(0, <[u8]>::len));
    out.extend_from_slice(&saturating_i32(normal.size).to_le_bytes());
    out.extend_from_slice(&normal.seed.to_le_bytes());
    out.extend_from_slice(&normal.multiplier.to_le_bytes());
    out.extend_from_slice(&normal.cloud_influence.to_le_bytes());
    out.extend_from_slice(&normal.cellular_influence.to_le_bytes());
    out.push(normal.show_seams as u8);

    for corner in cloud.corners() {
        out.extend_from_slice(&corner.to_le_bytes());
    }

    out.extend_from_slice(&cellular.metric.tag().to_le_bytes());
    out.extend_from_slice(&cellular.combiner.tag().to_le_bytes());

    let (points, regions, zoom) = match cellular.strategy {
        CellularStrategy::Subregion {
            feature_points_per_region,
            num_subregions,
        } => (feature_points_per_region, num_subregions, 0.0),
        CellularStrategy::CubeHash { zoom } => (0, 0, zoom),
    };
    match layout {
        CellularLayout::Subregion => {
            out.extend_from_slice(&saturating_i32(points).to_le_bytes());
            out.extend_from_slice(&saturating_i32(regions).to_le_bytes());
        }
        CellularLayout::SubregionScaled => {
            out.extend_from_slice(&saturating_i32(points).to_le_bytes());
            out.extend_from_slice(&saturating_i32(regions).to_le_bytes());
            out.extend_from_slice(&cellular.multiplier.to_le_bytes());
        }
        CellularLayout::CubeHash => {
            out.extend_from_slice(&zoom.to_le_bytes());
        }
    }

    if let Some(image) = image {
        out.extend_from_slice(image);
    }
    out
}

/// Parses an `.emb` byte buffer laid out as `layout`.
///
/// Values are returned as written, without sanitizing. Negative sizes and counts read
/// as 0; unknown metric and combiner tags read as the defaults.
pub fn decode(bytes: &[u8], layout: CellularLayout) -> Result<HeightmapFile, CodecError> {
    let mut r = ByteReader::new(bytes);

    let normal = NormalOptions {
        size: non_negative_u32(r.read_i32("size")?),
        seed: r.read_i32("seed")?,
        multiplier: r.read_f32("multiplier")?,
        cloud_influence: r.read_f32("cloud influence")?,
        cellular_influence: r.read_f32("cellular influence")?,
        show_seams: r.read_u8("show seams")? != 0,
        ..Default::default()
    };

    let cloud = CloudOptions {
        upper_left: r.read_f32("upper left corner")?,
        lower_left: r.read_f32("lower left corner")?,
        lower_right: r.read_f32("lower right corner")?,
        upper_right: r.read_f32("upper right corner")?,
    };

    let metric_tag = r.read_i32("metric")?;
    let combiner_tag = r.read_i32("combiner")?;
    let metric = DistanceMetric::from_tag(metric_tag).unwrap_or_else(|| {
        log::warn!("unknown metric tag {}, using default", metric_tag);
        DistanceMetric::default()
    });
    let combiner = Combiner::from_tag(combiner_tag).unwrap_or_else(|| {
        log::warn!("unknown combiner tag {}, using default", combiner_tag);
        Combiner::default()
    });

    let cellular = match layout {
        CellularLayout::Subregion | CellularLayout::SubregionScaled => {
            let feature_points_per_region = non_negative_u32(r.read_i32("feature points")?);
            let num_subregions = non_negative_u32(r.read_i32("subregions")?);
            let multiplier = if layout == CellularLayout::SubregionScaled {
                r.read_f32("cellular multiplier")?
            } else {
                CellularOptions::default().multiplier
            };
            CellularOptions {
                metric,
                combiner,
                strategy: CellularStrategy::Subregion {
                    feature_points_per_region,
                    num_subregions,
                },
                multiplier,
            }
        }
        CellularLayout::CubeHash => CellularOptions {
            metric,
            combiner,
            strategy: CellularStrategy::CubeHash {
                zoom: r.read_f32("zoom")?,
            },
            ..CellularOptions::worley()
        },
    };

    let rest = r.rest();
    let image = (!rest.is_empty()).then(|| rest.to_vec());

    Ok(HeightmapFile {
        options: TerrainOptions {
            normal,
            cloud,
            cellular,
        },
        image,
    })
}

/// Writes an `.emb` file, overwriting any existing file at `path`.
pub fn write_heightmap_file(
    path: &Path,
    options: &TerrainOptions,
    image: Option<&[u8]>,
) -> Result<(), CodecError> {
    let bytes = encode(options, image);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Reads an `.emb` file whose cellular block uses `layout`.
pub fn read_heightmap_file(
    path: &Path,
    layout: CellularLayout,
) -> Result<HeightmapFile, CodecError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, layout)
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn non_negative_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Little-endian cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(CodecError::Truncated { field })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.take(field)?))
    }

    fn read_f32(&mut self, field: &'static str) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take(field)?))
    }

    fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take::<1>(field)?[0])
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}
