//! PrefixSum - aggregate dimensions of scene objects sharing a name prefix.
//!
//! The core is [`analysis::aggregate`], a pure function over a snapshot of
//! scene entities. [`history::History`] records formatted summaries of each
//! calculation and [`report::export_csv`] writes the matched objects to a
//! semicolon-delimited file. [`session::Session`] ties these together for
//! the command-line front end.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod history;
pub mod models;
pub mod report;
pub mod scene;
pub mod session;

pub use analysis::{aggregate, matches};
pub use history::History;
pub use models::{
    AggregationResult, DecimalStyle, Dimensions, Entity, HistoryEntry, Operation,
    UnknownOperation,
};
pub use report::{export_csv, render_csv, ExportError};
pub use scene::{load_snapshot, SnapshotError};
pub use session::{Command, Session, Status};
