//! Terrain generator: owns the options and sub-generators and produces the heightmap.

use std::time::Instant;

use image::RgbImage;

use crate::erosion::{hydraulic_erosion, thermal_erosion_with_config, ErosionConfig};
use crate::export::{encode_rgb_png, field_to_rgb_image, PngExportError};
use crate::noise::{CellularField, CloudFractal};
use crate::terrain::{CellularOptions, CloudOptions, NormalOptions, ScalarField, TerrainOptions};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Cloud fractal field.
    Cloud,
    /// Cellular distance field.
    Cellular,
    /// Weighted sum of both fields.
    Blend,
    /// Thermal erosion (optional).
    Thermal,
    /// Hydraulic erosion (optional).
    Hydraulic,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Cloud => "cloud",
            StageId::Cellular => "cellular",
            StageId::Blend => "blend",
            StageId::Thermal => "thermal",
            StageId::Hydraulic => "hydraulic",
        }
    }
}

/// Generates heightmaps from a set of options.
///
/// Changing an option group rebuilds only the generators that depend on it. The last
/// heightmap stays readable until [`TerrainGenerator::generate`] runs again.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    options: TerrainOptions,
    erosion: ErosionConfig,
    cloud: CloudFractal,
    cellular: CellularField,
    heightmap: ScalarField,
    stale: bool,
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new(TerrainOptions::default())
    }
}

impl TerrainGenerator {
    /// Creates a generator; `options` are sanitized first.
    pub fn new(options: TerrainOptions) -> Self {
        let options = options.sanitized();
        let cloud = build_cloud(&options);
        let cellular = build_cellular(&options);
        Self {
            options,
            erosion: ErosionConfig::default(),
            cloud,
            cellular,
            heightmap: ScalarField::new(0),
            stale: true,
        }
    }

    /// Replaces the erosion parameters.
    pub fn with_erosion_config(mut self, erosion: ErosionConfig) -> Self {
        self.erosion = erosion;
        self.stale = true;
        self
    }

    pub fn options(&self) -> &TerrainOptions {
        &self.options
    }

    pub fn erosion_config(&self) -> &ErosionConfig {
        &self.erosion
    }

    /// Size and seed feed both generators, so both are rebuilt.
    pub fn set_normal_options(&mut self, normal: NormalOptions) {
        self.options.normal = normal.sanitized();
        self.cloud = build_cloud(&self.options);
        self.cellular = build_cellular(&self.options);
        self.stale = true;
    }

    pub fn set_cloud_options(&mut self, cloud: CloudOptions) {
        self.options.cloud = cloud.sanitized();
        self.cloud = build_cloud(&self.options);
        self.stale = true;
    }

    pub fn set_cellular_options(&mut self, cellular: CellularOptions) {
        self.options.cellular = cellular.sanitized();
        self.cellular = build_cellular(&self.options);
        self.stale = true;
    }

    /// The most recently generated heightmap (empty before the first run).
    pub fn heightmap(&self) -> &ScalarField {
        &self.heightmap
    }

    /// True if options changed since the heightmap was generated.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Generates a new heightmap.
    pub fn generate(&mut self) -> &ScalarField {
        self.generate_with_callbacks(|_, _, _| {}, |_, _, _| {})
    }

    /// Generates a new heightmap, reporting each stage.
    ///
    /// # Arguments
    /// * `on_stage_start` - Called with the stage, its position and the stage count
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn generate_with_callbacks<F1, F2>(
        &mut self,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> &ScalarField
    where
        F1: FnMut(StageId, usize, usize),
        F2: FnMut(StageId, usize, usize),
    {
        let normal = &self.options.normal;
        let mut stages = vec![StageId::Cloud, StageId::Cellular, StageId::Blend];
        if normal.use_thermal_erosion {
            stages.push(StageId::Thermal);
        }
        if normal.use_hydraulic_erosion {
            stages.push(StageId::Hydraulic);
        }
        let total = stages.len();

        // The two fields own separate generators, so they can run side by side.
        on_stage_start(StageId::Cloud, 0, total);
        on_stage_start(StageId::Cellular, 1, total);
        let start = Instant::now();
        let (cloud, cellular) = rayon::join(|| self.cloud.generate(), || self.cellular.generate());
        log::debug!("noise fields ({0}x{0}) in {1:?}", normal.size, start.elapsed());
        on_stage_complete(StageId::Cloud, 0, total);
        on_stage_complete(StageId::Cellular, 1, total);

        let mut heightmap = ScalarField::new(0);
        for (i, stage) in stages.iter().copied().enumerate().skip(2) {
            on_stage_start(stage, i, total);
            let start = Instant::now();
            heightmap = match stage {
                StageId::Blend => blend(
                    &cloud,
                    &cellular,
                    normal.cloud_influence,
                    normal.cellular_influence,
                ),
                StageId::Thermal => thermal_erosion_with_config(&heightmap, &self.erosion),
                StageId::Hydraulic => hydraulic_erosion(&heightmap, &self.erosion).heights,
                StageId::Cloud | StageId::Cellular => heightmap,
            };
            log::debug!("stage {} in {:?}", stage.name(), start.elapsed());
            on_stage_complete(stage, i, total);
        }

        self.heightmap = heightmap;
        self.stale = false;
        &self.heightmap
    }

    /// The heightmap scaled by the vertical multiplier.
    pub fn scaled_heightmap(&self) -> ScalarField {
        self.heightmap.scaled(self.options.normal.multiplier)
    }

    /// Grayscale RGB view of the heightmap.
    pub fn to_image(&self) -> RgbImage {
        field_to_rgb_image(&self.heightmap)
    }

    /// PNG encoding of [`TerrainGenerator::to_image`].
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, PngExportError> {
        encode_rgb_png(&self.heightmap)
    }
}

/// Per-cell `cellular_influence * cellular + cloud_influence * cloud`.
pub fn blend(
    cloud: &ScalarField,
    cellular: &ScalarField,
    cloud_influence: f32,
    cellular_influence: f32,
) -> ScalarField {
    debug_assert_eq!(cloud.size, cellular.size);
    let values = cloud
        .values
        .iter()
        .zip(&cellular.values)
        .map(|(&c, &v)| cellular_influence * v + cloud_influence * c)
        .collect();
    ScalarField {
        size: cloud.size,
        values,
    }
}

fn build_cloud(options: &TerrainOptions) -> CloudFractal {
    CloudFractal::new(
        options.normal.size,
        options.normal.seed as u32,
        options.cloud.corners(),
    )
}

fn build_cellular(options: &TerrainOptions) -> CellularField {
    CellularField::new(
        options.normal.size,
        options.normal.seed as u32,
        options.cellular,
    )
}
