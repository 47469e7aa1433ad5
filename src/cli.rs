//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Operation;
use clap::Parser;
use std::path::PathBuf;

/// PrefixSum - aggregate dimensions of scene objects sharing a name prefix
///
/// Loads a scene snapshot, sums a dimension, area, or volume over every
/// visible object whose name starts with the prefix, and optionally exports
/// the matched objects to a semicolon-delimited CSV file.
///
/// Operations: X, Y, Z, AREA_XY, AREA_XZ, AREA_YZ, AREA_XYZ, BIGGEST
/// (kebab-case names such as sum-x or max-dimension also work).
///
/// Examples:
///   prefixsum --scene scene.json --prefix Box --operation AREA_XY
///   prefixsum --scene scene.csv --prefix Wall --comma --export walls.csv
///   prefixsum --scene scene.json --interactive
///   prefixsum --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Scene snapshot to load (.json or .csv)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PREFIXSUM_SCENE",
        required_unless_present = "init_config"
    )]
    pub scene: Option<PathBuf>,

    /// Object name prefix (case-sensitive; empty matches every object)
    #[arg(short, long, value_name = "TEXT", conflicts_with = "active")]
    pub prefix: Option<String>,

    /// Use the full name of this object as the prefix
    #[arg(long, value_name = "NAME")]
    pub active: Option<String>,

    /// Operation to aggregate
    #[arg(short, long, value_name = "OP", env = "PREFIXSUM_OPERATION")]
    pub operation: Option<Operation>,

    /// Use a comma as decimal separator
    #[arg(long, conflicts_with = "dot")]
    pub comma: bool,

    /// Use a dot as decimal separator
    #[arg(long, conflicts_with = "comma")]
    pub dot: bool,

    /// Export the matched objects to CSV
    ///
    /// Without a value, writes to the configured export path
    /// (prefix_sum_export.csv by default).
    #[arg(short, long, value_name = "FILE", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Output format for the calculation (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Read commands from stdin instead of calculating once
    #[arg(short, long)]
    pub interactive: bool,

    /// Number of recent history entries to display
    #[arg(long, value_name = "COUNT")]
    pub history_limit: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .prefixsum.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .prefixsum.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for one-shot calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One status line (default)
    #[default]
    Text,
    /// JSON report with matched objects and history
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.history_limit == Some(0) {
            return Err("History limit must be at least 1".to_string());
        }

        if self.interactive && self.format == OutputFormat::Json {
            return Err("--format json is not available in interactive mode".to_string());
        }

        if let Some(ref scene) = self.scene {
            if !scene.exists() {
                return Err(format!("Scene file does not exist: {}", scene.display()));
            }
            if !scene.is_file() {
                return Err(format!("Scene path is not a file: {}", scene.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
