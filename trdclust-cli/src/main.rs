//! trdclust CLI: Command-line interface for pad-detector cluster reconstruction.
//!
//! Reads JSON events of sparse chamber digits and writes the reconstructed
//! clusters together with the clusterizer counters.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

mod event;

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::debug;

use trdclust_algorithms::{reconstruct_chambers, Clusterizer, PositionLut, LUT_BINS};
use trdclust_core::calibration::CalibrationTable;
use trdclust_core::geometry::{PadPlaneTransform, N_LAYER};
use trdclust_core::param::{PositionMethod, RecoParam};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

use crate::event::EventFile;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] trdclust_core::Error),

    #[error("Invalid input: {0}")]
    Input(String),
}

/// Position estimator selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    /// Pad-response lookup table (default)
    Lut,
    /// Five-pad center of gravity
    Cog,
}

impl From<Method> for PositionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Lut => PositionMethod::Lut,
            Method::Cog => PositionMethod::CenterOfGravity,
        }
    }
}

/// Pad-detector cluster reconstruction.
#[derive(Parser)]
#[command(name = "trdclust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct clusters from a JSON event
    Process {
        /// Input event file
        input: PathBuf,

        /// Output file for clusters and counters (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Reconstruction parameters (JSON, missing fields use defaults)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Override the position estimator
        #[arg(short, long, value_enum)]
        method: Option<Method>,

        /// Trigger mode: skip pad counting and the 7-pad signal record
        #[arg(long)]
        hlt: bool,

        /// Disable tail cancellation
        #[arg(long)]
        no_tail_cancellation: bool,

        /// Chamber-wide noise in ADC counts
        #[arg(long, default_value = "1.0")]
        noise: f32,

        /// Chamber-wide gain factor
        #[arg(long, default_value = "1.0")]
        gain: f32,

        /// Time offset in time bins
        #[arg(long, default_value = "0.0")]
        t0: f64,

        /// Drift velocity (cm/us)
        #[arg(long, default_value = "1.5")]
        drift_velocity: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a JSON event
    Info {
        /// Input event file
        input: PathBuf,
    },

    /// Print the default reconstruction parameters as JSON
    Params,

    /// Print the position lookup table of a layer
    Lut {
        /// Layer (0-5)
        #[arg(short, long, default_value = "0")]
        layer: u8,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Process { verbose: true, .. });
    env_logger::Builder::from_env(Env::default().default_filter_or(if verbose {
        "debug"
    } else {
        "warn"
    }))
    .init();

    match cli.command {
        Commands::Process {
            input,
            output,
            params,
            method,
            hlt,
            no_tail_cancellation,
            noise,
            gain,
            t0,
            drift_velocity,
            verbose,
        } => {
            let mut param = match params {
                Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
                None => RecoParam::default(),
            };
            if let Some(method) = method {
                param = param.with_position_method(method.into());
            }
            if hlt {
                param = param.with_hlt_mode(true);
            }
            if no_tail_cancellation {
                param = param.with_tail_cancellation(false);
            }

            if verbose {
                eprintln!("Reading: {}", input.display());
                eprintln!("Position method: {:?}", param.position_method);
                eprintln!("Tail cancellation: {}", param.tail_cancellation);
                eprintln!("HLT mode: {}", param.hlt_mode);
                eprintln!("Noise: {} ADC, gain: {}", noise, gain);
            }

            let event = EventFile::open(&input)?;
            let n_digits = event.digit_count();
            let mut calib = CalibrationTable::new()
                .with_noise(noise)
                .with_gain_factor(gain);
            event.apply_pad_status(&mut calib);
            debug!("{} bad pads registered", event.bad_pads.len());
            let mut chambers = event.into_chambers()?;

            let transform = PadPlaneTransform::default()
                .with_t0(t0)
                .with_drift_velocity(drift_velocity);
            let clusterizer = Clusterizer::builder(param)
                .calibration(&calib)
                .transform(&transform)
                .build()?;

            let start = Instant::now();
            let reconstruction = reconstruct_chambers(&clusterizer, &mut chambers)?;
            let elapsed = start.elapsed();

            if verbose {
                eprintln!("Writing output to: {}", output.display());
            }
            let mut writer = BufWriter::new(File::create(&output)?);
            serde_json::to_writer_pretty(&mut writer, &reconstruction)?;
            writer.flush()?;

            let stats = &reconstruction.statistics;
            println!(
                "Processed {} chambers ({} skipped) in {:.3}s",
                stats.chambers_processed,
                stats.chambers_skipped,
                elapsed.as_secs_f64()
            );
            println!("Digits: {}", n_digits);
            println!("Maxima: {}", stats.maxima);
            println!("Five-pad merges: {}", stats.five_pad_merges);
            println!("Clusters: {}", reconstruction.clusters.len());
            if stats.out_of_chamber > 0 {
                println!("Outside chamber: {}", stats.out_of_chamber);
            }
        }

        Commands::Info { input } => {
            let event = EventFile::open(&input)?;

            println!("File: {}", input.display());
            println!("Chambers: {}", event.chambers.len());
            println!("Digits: {}", event.digit_count());
            println!("Bad pads: {}", event.bad_pads.len());
            for chamber in &event.chambers {
                let charge: i64 = chamber.digits.iter().map(|d| i64::from(d.adc)).sum();
                println!(
                    "  detector {:3}: {}x{}x{}, {} digits, {} ADC",
                    chamber.detector,
                    chamber.rows,
                    chamber.cols,
                    chamber.time_bins,
                    chamber.digits.len(),
                    charge
                );
            }
        }

        Commands::Params => {
            println!("{}", serde_json::to_string_pretty(&RecoParam::default())?);
        }

        Commands::Lut { layer } => {
            if layer >= N_LAYER {
                return Err(CliError::Input(format!(
                    "layer {} out of range 0..{}",
                    layer, N_LAYER
                )));
            }
            let lut = PositionLut::new();
            let (min, max) = lut.range(layer);
            let width = (max - min) / (LUT_BINS - 1) as f64;

            println!("Layer {}: asymmetry range [{:.6}, {:.6}]", layer, min, max);
            println!("{:>4} {:>10} {:>10}", "bin", "asymmetry", "position");
            for bin in 0..LUT_BINS {
                if let Some(value) = lut.value(layer, bin) {
                    println!(
                        "{:>4} {:>10.6} {:>10.6}",
                        bin,
                        min + bin as f64 * width,
                        value
                    );
                }
            }
        }
    }

    Ok(())
}
