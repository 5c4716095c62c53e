use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image_fft::workspace::{self, Source, Workspace};
use image_fft::{
    Config, CorruptionConfig, CorruptionMode, LowPolicy, TransformOptions, VisualizeConfig,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nCopyright (c) 2026-",
    env!("BUILD_YEAR"),
    " Aodaruma"
);

#[derive(Parser)]
#[command(
    name = "image-fft",
    version,
    long_version = LONG_VERSION,
    about = "Stores images as per-channel FFT magnitude/phase records and renders spectral analyses"
)]
struct Cli {
    /// Directory holding `<name>.png` and the `<name>/` working directories
    #[arg(long, global = true, default_value = "Images")]
    root: PathBuf,

    /// Transform the three channels one after another instead of in parallel
    #[arg(long, global = true)]
    sequential: bool,

    /// Reject images whose sides are not powers of two
    #[arg(long = "require-pow2", global = true)]
    require_pow2: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Forward-transform `<root>/<name>.png` into `<root>/<name>/data.bytes`
    Encode { name: String },
    /// Rebuild `<root>/<name>/output.png` from `data.bytes`
    Decode {
        name: String,
        #[command(flatten)]
        corruption: CorruptionArgs,
    },
    /// Render `analysis_Mag.png` and `analysis_Pha.png`
    Analyze {
        name: String,
        /// Spectral data source
        #[arg(long, value_enum, default_value_t = SourceArg::Image)]
        from: SourceArg,
        /// Clamp negative log levels to the bottom row instead of reflecting them
        #[arg(long)]
        clamp_low: bool,
    },
    /// Write the forward spectrum's real parts, truncated to bytes, as `output.png`
    Preview { name: String },
    /// Forward and inverse transform the image straight into `output.png`
    Roundtrip { name: String },
}

#[derive(Args)]
struct CorruptionArgs {
    /// Corruption rounds as a percentage of the band size (0 disables)
    #[arg(long, default_value_t = 0.0)]
    strength: f64,
    /// Band start, percent of samples per grid
    #[arg(long, default_value_t = 40.0)]
    band_min: f64,
    /// Band end, percent of samples per grid
    #[arg(long, default_value_t = 60.0)]
    band_max: f64,
    /// Largest absolute offset added to a corrupted value
    #[arg(long, default_value_t = 64)]
    intensity: u32,
    /// Perturb all six grids each round instead of one
    #[arg(long)]
    corrupt_all_grids: bool,
    /// Seed for reproducible corruption
    #[arg(long)]
    seed: Option<u64>,
}

impl CorruptionArgs {
    fn to_config(&self) -> CorruptionConfig {
        CorruptionConfig {
            band_min_pct: self.band_min,
            band_max_pct: self.band_max,
            strength_pct: self.strength,
            intensity: self.intensity,
            mode: if self.corrupt_all_grids {
                CorruptionMode::AllGrids
            } else {
                CorruptionMode::SingleGrid
            },
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Image,
    Data,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config {
        transform: TransformOptions {
            parallel: !cli.sequential,
            require_power_of_two: cli.require_pow2,
        },
        ..Default::default()
    };

    match &cli.command {
        Command::Encode { name } => {
            let ws = Workspace::new(&cli.root, name);
            let set = workspace::encode(&ws, &config)
                .with_context(|| format!("Failed to encode {}", ws.image_path().display()))?;
            info!(width = set.width(), height = set.height(), "record written");
        }
        Command::Decode { name, corruption } => {
            config.corruption = corruption.to_config();
            let ws = Workspace::new(&cli.root, name);
            let report = match corruption.seed {
                Some(seed) => {
                    workspace::decode_with_rng(&ws, &config, &mut StdRng::seed_from_u64(seed))
                }
                None => workspace::decode(&ws, &config),
            }
            .with_context(|| format!("Failed to decode {}", ws.record_path().display()))?;
            if let Some(report) = report {
                info!(
                    band_min = report.band.min,
                    band_max = report.band.max,
                    rounds = report.rounds,
                    "corruption applied"
                );
            }
        }
        Command::Analyze {
            name,
            from,
            clamp_low,
        } => {
            config.visualize = VisualizeConfig {
                low_policy: if *clamp_low {
                    LowPolicy::Clamp
                } else {
                    LowPolicy::Reflect
                },
            };
            let source = match from {
                SourceArg::Image => Source::Image,
                SourceArg::Data => Source::Record,
            };
            let ws = Workspace::new(&cli.root, name);
            let analysis = workspace::analyze(&ws, source, &config)
                .with_context(|| format!("Failed to analyze {}", ws.name()))?;
            info!(warnings = analysis.warnings, "analysis written");
        }
        Command::Preview { name } => {
            let ws = Workspace::new(&cli.root, name);
            workspace::preview(&ws, &config)
                .with_context(|| format!("Failed to preview {}", ws.image_path().display()))?;
        }
        Command::Roundtrip { name } => {
            let ws = Workspace::new(&cli.root, name);
            workspace::roundtrip(&ws, &config)
                .with_context(|| format!("Failed to round-trip {}", ws.image_path().display()))?;
        }
    }

    info!("done");
    Ok(())
}
