//! EarthMake CLI - procedural terrain heightmap generator.
//!
//! Blends a cloud fractal with a cellular distance field, optionally erodes the
//! result, and writes it as PNG/RAW images plus an `.emb` parameter file.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use earthmake::codec::{read_heightmap_file, write_heightmap_file, CellularLayout};
use earthmake::erosion::ErosionConfig;
use earthmake::export::{
    export_field_png, export_field_raw, export_preview_png, expected_file_size,
    PngExportOptions, RawExportOptions, RawFormat,
};
use earthmake::noise::{Combiner, DistanceMetric};
use earthmake::pipeline::TerrainGenerator;
use earthmake::random::LcgRandom;
use earthmake::terrain::{closest_power_of_two, CellularStrategy, TerrainOptions};

/// Procedural terrain heightmap generator.
#[derive(Parser)]
#[command(name = "earthmake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a heightmap.
    Generate(GenerateArgs),

    /// Print the parameters stored in an `.emb` file.
    Inspect {
        /// The `.emb` file to read.
        file: PathBuf,

        /// The file stores cube-hash (Worley) parameters.
        #[arg(long, conflicts_with = "legacy")]
        worley: bool,

        /// The file stores subregion counts without a cellular multiplier.
        #[arg(long)]
        legacy: bool,
    },

    /// Display memory and file sizes for a heightmap size.
    Info {
        /// Heightmap edge length (rounded to a power of two).
        #[arg(short, long, default_value = "256")]
        size: u32,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// RON preset to start from; flags override its values.
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Write the effective options as a RON preset.
    #[arg(long)]
    save_preset: Option<PathBuf>,

    /// Heightmap edge length (rounded to a power of two, at most 2048).
    #[arg(long)]
    size: Option<u32>,

    /// Seed for reproducible generation (random if omitted).
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<i32>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Image export format.
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Skip writing the `.emb` parameter file.
    #[arg(long)]
    no_emb: bool,

    /// Weight of the cloud fractal.
    #[arg(long)]
    cloud_influence: Option<f32>,

    /// Weight of the cellular field.
    #[arg(long)]
    cellular_influence: Option<f32>,

    /// Vertical scale for RAW export.
    #[arg(long)]
    multiplier: Option<f32>,

    /// Cloud corners: upper-left, lower-left, lower-right, upper-right.
    #[arg(long, value_delimiter = ',')]
    corners: Option<Vec<f32>>,

    /// Distance metric of the cellular field.
    #[arg(long)]
    metric: Option<MetricArg>,

    /// How the nearest distances are combined.
    #[arg(long)]
    combiner: Option<CombinerArg>,

    /// Feature points per subregion.
    #[arg(long)]
    feature_points: Option<u32>,

    /// Number of subregions.
    #[arg(long)]
    subregions: Option<u32>,

    /// Use continuous Worley noise with this zoom instead of subregions.
    #[arg(long)]
    worley_zoom: Option<f32>,

    /// Scale applied to cellular distances before clamping.
    #[arg(long)]
    cellular_multiplier: Option<f32>,

    /// Run thermal erosion.
    #[arg(long)]
    thermal: bool,

    /// Run hydraulic erosion.
    #[arg(long)]
    hydraulic: bool,

    /// Thermal erosion iterations.
    #[arg(long, default_value = "3")]
    thermal_iters: u32,

    /// Number of hydraulic erosion timesteps.
    #[arg(long, default_value = "50")]
    erosion_steps: u32,

    /// Rainfall per erosion step.
    #[arg(long, default_value = "0.01")]
    rainfall: f32,

    /// Evaporation factor per erosion step (0-1).
    #[arg(long, default_value = "0.02")]
    evaporation: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 8-bit grayscale preview PNG.
    Png,
    /// 16-bit grayscale PNG.
    Png16,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    SquaredEuclidean,
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::SquaredEuclidean => DistanceMetric::SquaredEuclidean,
            MetricArg::Euclidean => DistanceMetric::Euclidean,
            MetricArg::Manhattan => DistanceMetric::Manhattan,
            MetricArg::Chebyshev => DistanceMetric::Chebyshev,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CombinerArg {
    D1,
    D2MinusD1,
    D3MinusD1,
}

impl From<CombinerArg> for Combiner {
    fn from(arg: CombinerArg) -> Self {
        match arg {
            CombinerArg::D1 => Combiner::D1,
            CombinerArg::D2MinusD1 => Combiner::D2MinusD1,
            CombinerArg::D3MinusD1 => Combiner::D3MinusD1,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Inspect {
            file,
            worley,
            legacy,
        } => {
            let layout = if worley {
                CellularLayout::CubeHash
            } else if legacy {
                CellularLayout::Subregion
            } else {
                CellularLayout::SubregionScaled
            };
            run_inspect(&file, layout);
        }
        Commands::Info { size } => run_info(size),
    }
}

/// Preset (or defaults) with every flag that was given applied on top.
fn build_options(args: &GenerateArgs) -> TerrainOptions {
    let mut options = match &args.preset {
        Some(path) => TerrainOptions::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading preset {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => TerrainOptions::default(),
    };

    let normal = &mut options.normal;
    if let Some(size) = args.size {
        normal.size = size;
    }
    if let Some(seed) = args.seed {
        normal.seed = seed;
    } else if args.preset.is_none() {
        normal.seed = LcgRandom::shared_next() as i32;
    }
    if let Some(v) = args.cloud_influence {
        normal.cloud_influence = v;
    }
    if let Some(v) = args.cellular_influence {
        normal.cellular_influence = v;
    }
    if let Some(v) = args.multiplier {
        normal.multiplier = v;
    }
    normal.use_thermal_erosion |= args.thermal;
    normal.use_hydraulic_erosion |= args.hydraulic;

    if let Some(corners) = &args.corners {
        let Ok([ul, ll, lr, ur]) = <[f32; 4]>::try_from(corners.as_slice()) else {
            eprintln!("Error: --corners takes exactly 4 comma-separated values");
            std::process::exit(1);
        };
        options.cloud.upper_left = ul;
        options.cloud.lower_left = ll;
        options.cloud.lower_right = lr;
        options.cloud.upper_right = ur;
    }

    let cellular = &mut options.cellular;
    if let Some(metric) = args.metric {
        cellular.metric = metric.into();
    }
    if let Some(combiner) = args.combiner {
        cellular.combiner = combiner.into();
    }
    if let Some(zoom) = args.worley_zoom {
        cellular.strategy = CellularStrategy::CubeHash { zoom };
        cellular.multiplier = 1.0;
    } else if args.feature_points.is_some() || args.subregions.is_some() {
        let (points, regions) = match cellular.strategy {
            CellularStrategy::Subregion {
                feature_points_per_region,
                num_subregions,
            } => (feature_points_per_region, num_subregions),
            CellularStrategy::CubeHash { .. } => (2, 4),
        };
        cellular.strategy = CellularStrategy::Subregion {
            feature_points_per_region: args.feature_points.unwrap_or(points),
            num_subregions: args.subregions.unwrap_or(regions),
        };
    }
    if let Some(v) = args.cellular_multiplier {
        cellular.multiplier = v;
    }

    options
}

fn run_generate(args: GenerateArgs) {
    let options = build_options(&args);
    let erosion = ErosionConfig {
        thermal_iterations: args.thermal_iters,
        hydraulic_steps: args.erosion_steps,
        rainfall: args.rainfall,
        evaporation: args.evaporation,
        ..Default::default()
    };

    let mut generator = TerrainGenerator::new(options).with_erosion_config(erosion);
    let options = generator.options().clone();

    println!("EarthMake - Procedural Terrain Generator");
    println!("========================================");
    println!("Size: {0}x{0}", options.normal.size);
    println!("Seed: {}", options.normal.seed);
    println!(
        "Blend: cloud {} / cellular {}",
        options.normal.cloud_influence, options.normal.cellular_influence
    );
    match options.cellular.strategy {
        CellularStrategy::Subregion {
            feature_points_per_region,
            num_subregions,
        } => println!(
            "Cellular: {} points x {} subregions, {} / {}",
            feature_points_per_region,
            num_subregions,
            options.cellular.metric.name(),
            options.cellular.combiner.name()
        ),
        CellularStrategy::CubeHash { zoom } => println!(
            "Cellular: worley zoom {}, {} / {}",
            zoom,
            options.cellular.metric.name(),
            options.cellular.combiner.name()
        ),
    }
    println!("Output: {}", args.output.display());

    if let Some(path) = &args.save_preset {
        options.save(path).unwrap_or_else(|e| {
            eprintln!("Error saving preset: {}", e);
            std::process::exit(1);
        });
        println!("Saved preset: {}", path.display());
    }

    let start = Instant::now();
    println!("\nRunning generation pipeline...");
    let heightmap = generator
        .generate_with_callbacks(
            |stage, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, stage.name());
            },
            |stage, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, stage.name());
            },
        )
        .clone();
    println!("Generation completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = heightmap.value_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    println!("\nExporting heightmap...");
    let export_start = Instant::now();

    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", args.name));
            export_preview_png(&heightmap, &path).unwrap_or_else(|e| {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            });
            println!("  Exported {}", path.display());
        }
        ExportFormat::Png16 => {
            let path = args.output.join(format!("{}.png", args.name));
            export_field_png(&heightmap, &path, &PngExportOptions::default()).unwrap_or_else(|e| {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            });
            println!("  Exported {} (16-bit)", path.display());
        }
        ExportFormat::Raw | ExportFormat::RawFloat => {
            let format = match args.format {
                ExportFormat::RawFloat => RawFormat::R32Float,
                _ => RawFormat::R16LittleEndian,
            };
            let raw_options = RawExportOptions::scaled(format, options.normal.multiplier);
            let path = args.output.join(format!("{}.raw", args.name));
            export_field_raw(&heightmap, &path, &raw_options).unwrap_or_else(|e| {
                eprintln!("Error exporting RAW: {}", e);
                std::process::exit(1);
            });
            println!("  Exported {} ({:?})", path.display(), format);
        }
    }

    if !args.no_emb {
        let png = generator.to_png_bytes().unwrap_or_else(|e| {
            eprintln!("Error encoding heightmap image: {}", e);
            std::process::exit(1);
        });
        let path = args.output.join(format!("{}.emb", args.name));
        write_heightmap_file(&path, &options, Some(&png)).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        });
        println!("  Exported {}", path.display());
    }

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_inspect(path: &Path, layout: CellularLayout) {
    let file = read_heightmap_file(path, layout).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let TerrainOptions {
        normal,
        cloud,
        cellular,
    } = &file.options;

    println!("{}", path.display());
    println!("==========================");
    println!("Size:               {}", normal.size);
    println!("Seed:               {}", normal.seed);
    println!("Multiplier:         {}", normal.multiplier);
    println!("Cloud influence:    {}", normal.cloud_influence);
    println!("Cellular influence: {}", normal.cellular_influence);
    println!("Show seams:         {}", normal.show_seams);
    println!("Cloud corners:      {:?}", cloud.corners());
    println!("Metric:             {}", cellular.metric.name());
    println!("Combiner:           {}", cellular.combiner.name());
    match cellular.strategy {
        CellularStrategy::Subregion {
            feature_points_per_region,
            num_subregions,
        } => {
            println!("Feature points:     {} per region", feature_points_per_region);
            println!("Subregions:         {}", num_subregions);
            println!("Cellular scale:     {}", cellular.multiplier);
        }
        CellularStrategy::CubeHash { zoom } => {
            println!("Worley zoom:        {}", zoom);
        }
    }

    match file.decode_image() {
        Ok(Some(field)) => {
            let (min, max) = field.value_range();
            println!("Image:              {0}x{0}, range [{1:.4}, {2:.4}]", field.size, min, max);
        }
        Ok(None) => println!("Image:              none"),
        Err(e) => println!("Image:              unreadable ({})", e),
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn run_info(size: u32) {
    let size = closest_power_of_two(size);
    let pixels = (size as u64) * (size as u64);

    // Cloud, cellular and blended fields are alive at the same time.
    let bytes_fields = pixels * 4 * 3;
    let bytes_png = pixels * 3;
    let bytes_raw_r16 = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r32 = expected_file_size(size, RawFormat::R32Float);

    println!("EarthMake - Heightmap Configuration Info");
    println!("========================================");
    println!();
    println!("Size: {0}x{0}", size);
    println!("Pixels: {:>12}", pixels);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Fields:   {:>12} bytes ({:.2} MB)", bytes_fields, mb(bytes_fields));
    println!();
    println!("Export file sizes:");
    println!("  PNG (RGB, raw): {:>10} bytes ({:.2} MB)", bytes_png, mb(bytes_png));
    println!("  RAW (R16):      {:>10} bytes ({:.2} MB)", bytes_raw_r16, mb(bytes_raw_r16));
    println!("  RAW (R32):      {:>10} bytes ({:.2} MB)", bytes_raw_r32, mb(bytes_raw_r32));
    println!();

    let defaults = TerrainOptions::default();
    println!("Default options:");
    println!(
        "  Blend:    cloud {} / cellular {}",
        defaults.normal.cloud_influence, defaults.normal.cellular_influence
    );
    println!("  Corners:  {:?}", defaults.cloud.corners());
    println!(
        "  Cellular: {} / {}, {:?}",
        defaults.cellular.metric.name(),
        defaults.cellular.combiner.name(),
        defaults.cellular.strategy
    );
    println!();
    println!("Unity terrain: heightmap resolution {} (power of 2 + 1)", size + 1);
}
