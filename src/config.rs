//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.prefixsum.toml` files.

use crate::history::DEFAULT_DISPLAY_LIMIT;
use crate::models::{DecimalStyle, Operation};
use crate::report::DEFAULT_EXPORT_FILE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".prefixsum.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default calculation inputs.
    #[serde(default)]
    pub calculation: CalculationConfig,

    /// Number formatting.
    #[serde(default)]
    pub format: FormatConfig,

    /// History display settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Inputs used when the command line does not give them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Object name prefix.
    #[serde(default)]
    pub prefix: String,

    /// Operation to aggregate.
    #[serde(default)]
    pub operation: Operation,
}

/// Number formatting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Decimal separator: "dot" or "comma".
    #[serde(default)]
    pub decimal_style: DecimalStyle,
}

/// History display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// How many of the most recent entries are shown.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
        }
    }
}

fn default_display_limit() -> usize {
    DEFAULT_DISPLAY_LIMIT
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default export file path.
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_FILE)
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref prefix) = args.prefix {
            self.calculation.prefix = prefix.clone();
        }
        if let Some(operation) = args.operation {
            self.calculation.operation = operation;
        }

        if args.comma || args.dot {
            self.format.decimal_style = DecimalStyle::from_comma_flag(args.comma);
        }

        if let Some(limit) = args.history_limit {
            self.history.display_limit = limit;
        }

        // `--export` without a value keeps the configured path
        if let Some(Some(ref path)) = args.export {
            self.export.path = path.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
