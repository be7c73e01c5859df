//! fasdd-prep: dataset preparation and annotation analysis for fire/smoke
//! YOLO detection.
//!
//! The crate reorganizes the FASDD_CV source dataset into the
//! `images/<split>` + `labels/<split>` layout a YOLO trainer expects, writes
//! the matching `data.yaml`, and reports annotation statistics with
//! histogram plots. Training, export and evaluation are delegated to the
//! external `yolo` command line.
//!
//! # Modules
//!
//! - [`dataset`]: layout, manifests, annotation lines and the class schema
//! - [`organize`]: manifest-driven copy into the YOLO layout
//! - [`analyze`]: annotation statistics and the printed summary
//! - [`plot`]: histogram rendering
//! - [`collab`]: `yolo` command construction and launch
//! - [`config`]: defaults, config file and command-line overrides
//! - [`error`]: the crate error type

pub mod analyze;
pub mod collab;
pub mod config;
pub mod dataset;
pub mod error;
pub mod organize;
pub mod plot;
pub mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use config::{AnalyzeOverrides, OrganizeOverrides, PrepConfig};
use dataset::Split;
use progress::{ConsoleProgress, NoProgress, ProgressObserver};

pub use error::PrepError;

/// The fasdd-prep CLI application.
#[derive(Parser)]
#[command(name = "fasdd-prep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Tool configuration file (YAML).
    #[arg(long, global = true, env = "FASDD_PREP_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the source dataset (default: FASDD_CV).
    #[arg(long, global = true)]
    dataset_root: Option<PathBuf>,

    /// Hide progress bars.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Copy manifest-listed image/label pairs into the YOLO layout.
    Organize(OrganizeArgs),
    /// Print annotation statistics and render histograms.
    Analyze(AnalyzeArgs),
    /// Train a detector with the yolo CLI.
    Train(TrainArgs),
    /// Export trained weights with the yolo CLI.
    Export(ExportArgs),
    /// Validate trained weights on a split with the yolo CLI.
    Evaluate(EvaluateArgs),
}

#[derive(clap::Args)]
struct OrganizeArgs {
    /// Source image directory.
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Source label directory.
    #[arg(long)]
    labels_dir: Option<PathBuf>,

    /// Directory holding train.txt, val.txt and test.txt.
    #[arg(long)]
    manifests_dir: Option<PathBuf>,

    /// Destination root for the organized layout.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Where to write the data config.
    #[arg(long)]
    data_yaml: Option<PathBuf>,

    /// Class name, in id order (repeatable).
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Organized dataset root (default: <dataset-root>/yolo_format).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Splits to analyze.
    #[arg(long, value_enum, value_delimiter = ',')]
    splits: Vec<Split>,

    /// Class name, in id order (repeatable).
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,

    /// Read class names from an existing data config.
    #[arg(long)]
    data_yaml: Option<PathBuf>,

    /// Directory for histogram images.
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// TrueType font for titles and axis labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Skip histogram rendering.
    #[arg(long)]
    no_plots: bool,

    /// Output format for the summary.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Options shared by the collaborator subcommands.
#[derive(clap::Args)]
struct LaunchArgs {
    /// Print the command instead of running it.
    #[arg(long)]
    dry_run: bool,

    /// Collaborator executable.
    #[arg(long, default_value = collab::DEFAULT_PROGRAM)]
    program: String,
}

#[derive(clap::Args)]
struct TrainArgs {
    /// Data config (default: the organizer's data.yaml).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Starting weights.
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    epochs: Option<u32>,

    #[arg(long)]
    batch: Option<i32>,

    #[command(flatten)]
    launch: LaunchArgs,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Trained weights to export.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Export format (e.g. ncnn, onnx).
    #[arg(long)]
    format: Option<String>,

    #[command(flatten)]
    launch: LaunchArgs,
}

#[derive(clap::Args)]
struct EvaluateArgs {
    /// Data config (default: the organizer's data.yaml).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Trained or exported weights.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Split to validate on.
    #[arg(long, value_enum)]
    split: Option<Split>,

    #[command(flatten)]
    launch: LaunchArgs,
}

/// Run the fasdd-prep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = PrepConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.dataset_root {
        config.dataset_root = Some(root.clone());
    }

    let mut progress: Box<dyn ProgressObserver> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ConsoleProgress::new())
    };

    match cli.command {
        Some(Commands::Organize(args)) => run_organize(args, &config, progress.as_mut()),
        Some(Commands::Analyze(args)) => run_analyze(args, &config, progress.as_mut()),
        Some(Commands::Train(args)) => run_train(args, &config),
        Some(Commands::Export(args)) => run_export(args, &config),
        Some(Commands::Evaluate(args)) => run_evaluate(args, &config),
        None => {
            println!("fasdd-prep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset preparation and annotation EDA for fire/smoke YOLO detection.");
            println!();
            println!("Run 'fasdd-prep --help' for usage information.");
            Ok(())
        }
    }
}

/// `info` by default, `debug` with `-v`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn run_organize(
    args: OrganizeArgs,
    config: &PrepConfig,
    progress: &mut dyn ProgressObserver,
) -> Result<(), PrepError> {
    let overrides = OrganizeOverrides {
        dataset_root: None,
        images_dir: args.images_dir,
        labels_dir: args.labels_dir,
        manifests_dir: args.manifests_dir,
        output_dir: args.output_dir,
        data_yaml: args.data_yaml,
        class_names: args.classes,
    };
    let organize_config = config.organize_config(&overrides)?;
    let report = organize::organize_dataset(&organize_config, progress)?;
    print!("{}", report);
    Ok(())
}

fn run_analyze(
    args: AnalyzeArgs,
    config: &PrepConfig,
    progress: &mut dyn ProgressObserver,
) -> Result<(), PrepError> {
    let overrides = AnalyzeOverrides {
        root: args.root,
        images_dir: None,
        labels_dir: None,
        splits: args.splits,
        class_names: args.classes,
        data_yaml: args.data_yaml,
        plots_dir: args.plots_dir,
        font: args.font,
        no_plots: args.no_plots,
    };
    let analyze_config = config.analyze_config(&overrides)?;
    let run = analyze::run_analysis(&analyze_config, progress)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Text => {
            print!("{}", run.summary);
            if !run.plots.is_empty() {
                println!();
                println!("Plots written to {}:", analyze_config.plots_dir.display());
                for plot in &run.plots {
                    println!("  {}", plot.path.display());
                }
            }
        }
    }
    Ok(())
}

fn run_train(args: TrainArgs, config: &PrepConfig) -> Result<(), PrepError> {
    let mut params = config.train.clone();
    if let Some(model) = args.model {
        params.model = model;
    }
    if let Some(epochs) = args.epochs {
        params.epochs = epochs;
    }
    if let Some(batch) = args.batch {
        params.batch = batch;
    }

    let data = args.data.unwrap_or_else(|| config.data_yaml_path());
    let command = params.command(&args.launch.program, &data);
    if args.launch.dry_run {
        println!("{}", command);
        return Ok(());
    }

    collab::check_data_config(&data)?;
    collab::launch(&command)
}

fn run_export(args: ExportArgs, config: &PrepConfig) -> Result<(), PrepError> {
    let mut params = config.export.clone();
    if let Some(model) = args.model {
        params.model = model;
    }
    if let Some(format) = args.format {
        params.format = format;
    }

    let command = params.command(&args.launch.program);
    if args.launch.dry_run {
        println!("{}", command);
        return Ok(());
    }

    collab::check_model(&params.model)?;
    collab::launch(&command)
}

fn run_evaluate(args: EvaluateArgs, config: &PrepConfig) -> Result<(), PrepError> {
    let mut params = config.evaluate.clone();
    if let Some(model) = args.model {
        params.model = model;
    }
    if let Some(split) = args.split {
        params.split = split.to_string();
    }

    let data = args.data.unwrap_or_else(|| config.data_yaml_path());
    let command = params.command(&args.launch.program, &data);
    if args.launch.dry_run {
        println!("{}", command);
        return Ok(());
    }

    collab::check_model(&params.model)?;
    collab::check_data_config(&data)?;
    collab::launch(&command)
}
