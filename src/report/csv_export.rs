//! Semicolon-delimited export of a calculation.
//!
//! The file holds a summary row, a column header row, and one row per
//! matched entity with its dimensions.

use crate::models::{AggregationResult, DecimalStyle, Operation};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Field delimiter of exported files.
pub const DELIMITER: u8 = b';';

/// File name used when no export path is configured.
pub const DEFAULT_EXPORT_FILE: &str = "prefix_sum_export.csv";

/// Export failure.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to encode CSV for {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Classify a writer failure: I/O underneath the csv layer stays `Io`.
fn write_error(path: &Path, source: csv::Error) -> ExportError {
    if !source.is_io_error() {
        return ExportError::Csv {
            path: path.to_path_buf(),
            source,
        };
    }

    let source = match source.into_kind() {
        csv::ErrorKind::Io(err) => err,
        kind => io::Error::new(io::ErrorKind::Other, format!("{:?}", kind)),
    };
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DELIMITER)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

/// Write the summary, header, and entity rows.
fn write_rows<W: io::Write>(
    writer: &mut csv::Writer<W>,
    prefix: &str,
    operation: Operation,
    result: &AggregationResult,
    style: DecimalStyle,
) -> csv::Result<()> {
    writer.write_record([
        format!("Prefix: {}", prefix),
        format!("Operation: {}", operation.code()),
        format!("Sum: {}", style.format(result.value)),
    ])?;
    writer.write_record(["Object Name", "X", "Y", "Z"])?;

    for entity in &result.matched_entities {
        let d = &entity.dimensions;
        writer.write_record([
            entity.name.clone(),
            style.format(d.x),
            style.format(d.y),
            style.format(d.z),
        ])?;
    }

    Ok(())
}

/// Render the export to a string.
pub fn render_csv(
    prefix: &str,
    operation: Operation,
    result: &AggregationResult,
    style: DecimalStyle,
) -> csv::Result<String> {
    let mut writer = writer_builder().from_writer(Vec::new());
    write_rows(&mut writer, prefix, operation, result, style)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the export to `path`, replacing any existing file.
///
/// Returns the path written on success.
pub fn export_csv(
    path: &Path,
    prefix: &str,
    operation: Operation,
    result: &AggregationResult,
    style: DecimalStyle,
) -> Result<PathBuf, ExportError> {
    debug!("Opening export file: {}", path.display());

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = writer_builder().from_writer(file);
    write_rows(&mut writer, prefix, operation, result, style)
        .map_err(|source| write_error(path, source))?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Exported {} rows to {}",
        result.matched_entities.len(),
        path.display()
    );
    Ok(path.to_path_buf())
}
