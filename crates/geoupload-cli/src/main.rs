//! Command-line interface for `geoupload`, converting uploaded vector datasets to `GeoJSON`.
//!
//! This binary is a thin façade over the [`geoupload_core`] library: it parses arguments,
//! configures logging and delegates to command handlers.
//!
//! # Available Commands
//!
//! - `convert` - Convert a Shapefile, KML or GML dataset to `GeoJSON`
//! - `info` - Display dataset information and metadata
//! - `drivers` - List all known format drivers and their capabilities

mod display;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geoupload_core::drivers::get_available_drivers;
use geoupload_core::operations;
use geoupload_core::{
    AxisOrder, ConversionOutcome, ConvertOptions, Crs, GeoUploadError, ReprojectionError, WriteError,
};

use crate::display::{display_dataset_info, display_drivers};

#[derive(Parser)]
#[command(
    name = "geoupload",
    version,
    about = "Convert uploaded vector geodata to GeoJSON",
    long_about = "geoupload reads ESRI Shapefiles, KML/KMZ and GML files, optionally reprojects\n\
                  them to another EPSG coordinate system and writes a GeoJSON FeatureCollection."
)]
/// Command-line arguments and options for the `geoupload` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `geoupload` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Converts a dataset to a `GeoJSON` `FeatureCollection`.
    ///
    /// The format is chosen from the input extension. Companion files (.shx, .dbf, .prj)
    /// are picked up from the input's directory.
    Convert {
        /// Path to the primary file of the input dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: PathBuf,

        /// Path of the `GeoJSON` output. Written to standard output when omitted.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Reproject coordinates to this CRS (e.g., "EPSG:3857").
        #[arg(short = 't', long, value_name = "CRS")]
        target_crs: Option<String>,

        /// Axis order of written coordinates: "xy" or "authority".
        #[arg(long, value_name = "ORDER", default_value = "xy")]
        axis_order: String,

        /// CRS assumed when the dataset declares none.
        #[arg(long, value_name = "CRS", default_value = "EPSG:4326")]
        default_crs: String,

        /// Pretty-print the output.
        #[arg(long)]
        pretty: bool,
    },

    /// Displays information about a dataset.
    Info {
        /// Path to the primary file of the dataset.
        #[arg(value_name = "DATASET")]
        input: PathBuf,
    },

    /// Lists all known drivers and their capabilities.
    Drivers,
}

/// Entry point for the `geoupload` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    // Standard output may carry the GeoJSON, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            target_crs,
            axis_order,
            default_crs,
            pretty,
        } => {
            let options = build_options(target_crs.as_deref(), &axis_order, &default_crs, pretty)
                .map_err(report)?;
            handle_convert(&input, output.as_deref(), &options)?;
        },
        Commands::Info { input } => {
            info!("Displaying info for {}", input.display());
            handle_info(&input)?;
        },
        Commands::Drivers => {
            handle_drivers();
        },
    }

    Ok(())
}

/// Turns a library error into the message shown to the user.
fn report(err: GeoUploadError) -> anyhow::Error {
    debug!("{err:?}");
    match err.recovery_suggestion() {
        Some(hint) => anyhow!("{}\nHint: {hint}", err.user_message()),
        None => anyhow!("{}", err.user_message()),
    }
}

fn build_options(
    target_crs: Option<&str>,
    axis_order: &str,
    default_crs: &str,
    pretty: bool,
) -> geoupload_core::Result<ConvertOptions> {
    let axis_order: AxisOrder = axis_order.parse()?;
    let default_crs: Crs = default_crs.parse().map_err(ReprojectionError::from)?;
    let mut options = ConvertOptions::new()
        .with_axis_order(axis_order)
        .with_default_crs(default_crs)
        .with_pretty(pretty);
    if let Some(target) = target_crs {
        options = options.with_target_crs(target.parse().map_err(ReprojectionError::from)?);
    }
    Ok(options)
}

fn handle_convert(input: &Path, output: Option<&Path>, options: &ConvertOptions) -> Result<()> {
    info!("Validating convert command:");
    info!("Input: {}", input.display());
    if let Some(output) = output {
        info!("Output: {}", output.display());
    }

    let (work_dir, descriptor) = operations::discover(input).map_err(report)?;
    debug!("Dataset files: {:?}", descriptor.files());

    let outcome = match output {
        Some(path) => convert_to_file(&descriptor, &work_dir, options, path),
        None => {
            let stdout = io::stdout();
            let mut sink = BufWriter::new(stdout.lock());
            let outcome = operations::convert(&descriptor, &work_dir, options, &mut sink);
            if outcome.as_ref().is_ok_and(|outcome| !outcome.is_empty()) {
                writeln!(sink).map_err(|err| anyhow!("Failed to write to standard output: {err}"))?;
            }
            outcome
        },
    }
    .map_err(report)?;

    match outcome {
        ConversionOutcome::Empty => {
            warn!("{} contains no features, nothing was written", input.display());
        },
        ConversionOutcome::Written {
            features,
            source_crs,
            target_crs,
        } => {
            info!("Wrote {features} feature(s), {source_crs} -> {target_crs}");
        },
    }
    Ok(())
}

/// Writes to `path`, removing the file again when the conversion produced nothing.
fn convert_to_file(
    descriptor: &geoupload_core::FileDescriptor,
    work_dir: &Path,
    options: &ConvertOptions,
    path: &Path,
) -> geoupload_core::Result<ConversionOutcome> {
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let result = operations::convert(descriptor, work_dir, options, BufWriter::new(file));
    if !matches!(result, Ok(ConversionOutcome::Written { .. })) {
        remove_partial_output(path);
    }
    result
}

/// Deletes an output file left behind by a conversion that wrote no collection.
fn remove_partial_output(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) => {
            warn!("Could not remove {}: {err}", path.display());
            false
        },
    }
}

fn handle_info(input: &Path) -> Result<()> {
    let (work_dir, descriptor) = operations::discover(input).map_err(report)?;
    let info = operations::inspect(&descriptor, &work_dir).map_err(report)?;
    display_dataset_info(&info);
    Ok(())
}

/// Handles the `drivers` subcommand by displaying a formatted table of available drivers.
fn handle_drivers() {
    display_drivers(&get_available_drivers());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options_defaults() {
        let options = build_options(None, "xy", "EPSG:4326", false).unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_build_options_with_target() {
        let options = build_options(Some("EPSG:3857"), "authority", "4326", true).unwrap();
        assert_eq!(options.target_crs, Some(Crs::WEB_MERCATOR));
        assert_eq!(options.axis_order, AxisOrder::Authority);
        assert!(options.pretty);
    }

    #[test]
    fn test_build_options_invalid_axis_order() {
        let err = build_options(None, "yx", "EPSG:4326", false).unwrap_err();
        assert!(matches!(err, GeoUploadError::Config(_)));
    }

    #[test]
    fn test_build_options_invalid_crs() {
        let err = build_options(Some("mercator"), "xy", "EPSG:4326", false).unwrap_err();
        assert!(matches!(err, GeoUploadError::Reprojection(_)));
    }

    #[test]
    fn test_report_includes_hint() {
        let err = build_options(None, "yx", "EPSG:4326", false).unwrap_err();
        let message = report(err).to_string();
        assert!(message.starts_with("Configuration error: Invalid axis-order option"));
        assert!(message.contains("Hint: "));
    }

    #[test]
    fn test_remove_partial_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.geojson");
        fs::write(&path, "").unwrap();
        assert!(remove_partial_output(&path));
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_partial_output_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!remove_partial_output(&dir.path().join("never-created.geojson")));
    }
}
