//! bccdprep: dataset preparation for blood-cell detection.
//!
//! Converts the BCCD dataset (Pascal VOC XML annotations plus JPEG images)
//! into an Ultralytics-style YOLO dataset: class-whitelisted, normalized
//! center/size labels, a deterministic seeded train/val/test split, and a
//! `data.yaml` manifest for the training collaborator.
//!
//! # Modules
//!
//! - [`ir`]: records, typed bounding boxes, VOC reader and YOLO writer
//! - [`split`]: seeded train/val/test partitioning
//! - [`conversion`]: the conversion pass and its run report
//! - [`config`]: run configuration (YAML file + CLI overrides)
//! - [`collab`]: detector/trainer contracts, center export, FPS benchmark
//! - [`error`]: error type

pub mod collab;
pub mod config;
pub mod conversion;
pub mod error;
pub mod ir;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use config::ConvertConfig;
pub use conversion::{convert, ConvertOutcome};
pub use error::BccdError;

/// The bccdprep CLI application.
#[derive(Parser)]
#[command(name = "bccdprep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the raw VOC dataset into a YOLO dataset.
    Convert(ConvertArgs),
    /// Show the train/val/test assignment without writing anything.
    Plan(PlanArgs),
}

/// Arguments shared by every subcommand that reads the raw dataset.
#[derive(clap::Args)]
struct SourceArgs {
    /// YAML config file; flags below override its values.
    #[arg(long, env = "BCCDPREP_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the raw dataset checkout.
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// VOC annotation directory (default: <raw-dir>/BCCD/Annotations).
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Source image directory (default: <raw-dir>/BCCD/JPEGImages).
    #[arg(long)]
    images: Option<PathBuf>,

    /// Ordered class whitelist, comma-separated.
    #[arg(long, value_delimiter = ',')]
    classes: Option<Vec<String>>,

    /// Train/val/test ratios, e.g. 0.8,0.1,0.1.
    #[arg(long)]
    split: Option<String>,

    /// Seed for the split shuffle.
    #[arg(long)]
    seed: Option<u64>,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output dataset root.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Manifest path (default: <output>/data.yaml).
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Keep images whose annotations are all filtered out, with empty labels.
    /// `--keep-empty-images=false` overrides a config file that enables it.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    keep_empty_images: Option<bool>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the plan subcommand.
#[derive(clap::Args)]
struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// List every file under its split instead of only the counts.
    #[arg(long)]
    list: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the bccdprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), BccdError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Plan(args)) => run_plan(args),
        None => {
            println!("bccdprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Blood-cell detection dataset preparation.");
            println!();
            println!("Run 'bccdprep --help' for usage information.");
            Ok(())
        }
    }
}

fn load_config(source: &SourceArgs) -> Result<ConvertConfig, BccdError> {
    let mut config = match &source.config {
        Some(path) => ConvertConfig::from_yaml_file(path)?,
        None => ConvertConfig::default(),
    };

    if let Some(raw_dir) = &source.raw_dir {
        config.raw_dir = raw_dir.clone();
    }
    if let Some(annotations) = &source.annotations {
        config.annotations_dir = Some(annotations.clone());
    }
    if let Some(images) = &source.images {
        config.images_dir = Some(images.clone());
    }
    if let Some(classes) = &source.classes {
        config.class_whitelist = ir::ClassList::new(classes.iter().cloned())?;
    }
    if let Some(split) = &source.split {
        config.split_ratios = split.parse()?;
    }
    if let Some(seed) = source.seed {
        config.seed = seed;
    }

    Ok(config)
}

fn run_convert(args: ConvertArgs) -> Result<(), BccdError> {
    let mut config = load_config(&args.source)?;
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(manifest) = args.manifest {
        config.manifest_path = Some(manifest);
    }
    if let Some(keep) = args.keep_empty_images {
        config.keep_empty_images = keep;
    }

    let outcome = convert(&config)?;

    match args.report {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        }
        ReportFormat::Text => {
            print!("{}", outcome.report);
            println!();
            println!("Dataset written to {}", outcome.manifest.path);
            println!("Manifest written to {}", outcome.manifest_path.display());
        }
    }

    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<(), BccdError> {
    let config = load_config(&args.source)?;
    let plan = conversion::plan(&config)?;

    println!(
        "{} annotation file(s), seed {}:",
        plan.len(),
        config.seed
    );
    for split in split::Split::ALL {
        println!("  {:<5} {}", split.dir_name(), plan.files(split).len());
        if args.list {
            for path in plan.files(split) {
                println!("    {}", path.display());
            }
        }
    }

    Ok(())
}
