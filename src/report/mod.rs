//! Report generation.
//!
//! CSV export of a single calculation, plus a JSON rendering of a
//! calculation and the visible history for machine consumers.

pub mod csv_export;

pub use csv_export::{export_csv, render_csv, ExportError, DEFAULT_EXPORT_FILE};

use crate::models::{AggregationResult, DecimalStyle, HistoryEntry, Operation};
use anyhow::Result;
use serde::Serialize;

/// A calculation together with the inputs that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationReport<'a> {
    pub prefix: &'a str,
    pub operation: Operation,
    pub decimal_style: DecimalStyle,
    /// The value formatted as it appears in history and exports.
    pub formatted_value: String,
    pub result: &'a AggregationResult,
    /// Most recent history entries, oldest first.
    pub history: &'a [HistoryEntry],
}

impl<'a> CalculationReport<'a> {
    pub fn new(
        prefix: &'a str,
        operation: Operation,
        decimal_style: DecimalStyle,
        result: &'a AggregationResult,
        history: &'a [HistoryEntry],
    ) -> Self {
        Self {
            prefix,
            operation,
            decimal_style,
            formatted_value: decimal_style.format(result.value),
            result,
            history,
        }
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &CalculationReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
