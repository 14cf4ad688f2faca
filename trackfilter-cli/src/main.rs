//!
//! Command-line front end: filters event files with the cluster-size filter.
#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use trackfilter_algorithms::{EventProcessor, FilterClusters};
use trackfilter_core::config::FilterParameters;
use trackfilter_io::{load_parameters, EventFileReader, EventFileWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Io(#[from] trackfilter_io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] trackfilter_core::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run {run} event {event}: {source}")]
    Event {
        run: u32,
        event: u32,
        source: trackfilter_core::Error,
    },
}

/// Steering overrides shared by subcommands.
#[derive(clap::Args, Debug)]
struct SteeringArgs {
    /// JSON steering file
    #[arg(short, long)]
    steering: Option<PathBuf>,

    /// Detector type ("Barrel" or anything else for endcap)
    #[arg(long)]
    detector_type: Option<String>,

    /// Zone boundaries in theta (barrel) or r (endcap)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    input_ranges: Option<Vec<String>>,

    /// Cluster-size cut per zone
    #[arg(long, value_delimiter = ',')]
    cluster_size: Option<Vec<String>>,

    /// Layers excluded from the output
    #[arg(long, value_delimiter = ',')]
    layers: Option<Vec<String>>,

    /// Input hit collection
    #[arg(long)]
    in_hits: Option<String>,

    /// Input relation collection
    #[arg(long)]
    in_relations: Option<String>,

    /// Output hit collection
    #[arg(long)]
    out_hits: Option<String>,

    /// Output relation collection
    #[arg(long)]
    out_relations: Option<String>,

    /// Cell-ID encoding string
    #[arg(long)]
    cell_id_encoding: Option<String>,
}

impl SteeringArgs {
    /// Loads the steering file (if any) and applies command-line overrides.
    fn resolve(self) -> Result<FilterParameters> {
        let mut params = match &self.steering {
            Some(path) => load_parameters(path)?,
            None => FilterParameters::default(),
        };
        if let Some(value) = self.detector_type {
            params.detector_type = value;
        }
        if let Some(value) = self.input_ranges {
            params.input_ranges = value;
        }
        if let Some(value) = self.cluster_size {
            params.cluster_size = value;
        }
        if let Some(value) = self.layers {
            params.layers = value;
        }
        if let Some(value) = self.in_hits {
            params.in_tracker_hit_collection = value;
        }
        if let Some(value) = self.in_relations {
            params.in_relation_collection = value;
        }
        if let Some(value) = self.out_hits {
            params.out_tracker_hit_collection = value;
        }
        if let Some(value) = self.out_relations {
            params.out_relation_collection = value;
        }
        if let Some(value) = self.cell_id_encoding {
            params.cell_id_encoding = value;
        }
        Ok(params)
    }
}

/// Cluster-size filtering of tracker hits.
#[derive(Parser)]
#[command(name = "trackfilter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter an event file and write the events with the filtered collections added
    Filter {
        /// Input event file
        input: PathBuf,

        /// Output event file
        #[arg(short, long)]
        output: PathBuf,

        /// Classify hits on a single thread
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        steering: SteeringArgs,
    },

    /// Show the collections of each event in a file
    Info {
        /// Input event file
        input: PathBuf,
    },

    /// Validate steering parameters and print the resolved configuration
    Check {
        #[command(flatten)]
        steering: SteeringArgs,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_filter(input: &Path, output: &Path, sequential: bool, steering: SteeringArgs) -> Result<()> {
    // Configuration is rejected before the input is opened.
    let params = steering.resolve()?;
    let stage = FilterClusters::new(params.validate()?).with_parallel(!sequential);

    let start = Instant::now();
    let reader = EventFileReader::open(input)?;
    let mut writer = EventFileWriter::create(output)?;
    debug!("Reading {}, writing {}", input.display(), output.display());

    for event in reader {
        let mut event = event?;
        stage
            .process_event(&mut event)
            .map_err(|source| CliError::Event {
                run: event.run,
                event: event.number,
                source,
            })?;
        writer.write_event(&event)?;
    }
    writer.flush()?;

    info!(
        "{}: {} events in {:.2}s",
        stage.name(),
        writer.events_written(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_info(input: &Path) -> Result<()> {
    println!("File: {}", input.display());
    for event in EventFileReader::open(input)? {
        let event = event?;
        println!("Run {} event {}", event.run, event.number);
        for (name, collection) in event.collections() {
            println!(
                "  {:<40} {:<16} {:>8}{}",
                name,
                collection.collection_type().to_string(),
                collection.len(),
                if collection.is_subset() { " (subset)" } else { "" }
            );
        }
    }
    Ok(())
}

fn run_check(steering: SteeringArgs) -> Result<()> {
    let params = steering.resolve()?;
    let config = params.validate()?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    println!("{config}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Filter {
            input,
            output,
            sequential,
            steering,
        } => run_filter(&input, &output, sequential, steering),
        Commands::Info { input } => run_info(&input),
        Commands::Check { steering } => run_check(steering),
    }
}
