//! Analysis modules.
//!
//! Aggregation of entity dimensions by name prefix.

pub mod aggregator;

pub use aggregator::*;
