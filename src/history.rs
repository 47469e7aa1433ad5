//! Calculation history.
//!
//! An append-only, caller-owned log of aggregation summaries. Entries are
//! never edited or removed one by one; the whole log can be cleared.

use crate::models::{AggregationResult, DecimalStyle, HistoryEntry, Operation};
use chrono::Utc;
use tracing::debug;

/// Number of entries shown by [`History::recent`] unless configured otherwise.
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

/// Ordered log of past calculations.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    display_limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_LIMIT)
    }
}

impl History {
    /// Create an empty history that displays at most `display_limit` entries.
    pub fn new(display_limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            display_limit,
        }
    }

    /// Append a summary of `result` and return the new entry.
    pub fn record(
        &mut self,
        prefix: &str,
        operation: Operation,
        result: &AggregationResult,
        style: DecimalStyle,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            summary: format_summary(prefix, operation, result, style),
            recorded_at: Utc::now(),
        };
        debug!("History entry #{}: {}", self.entries.len() + 1, entry.summary);
        self.entries.push(entry.clone());
        entry
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        debug!("Clearing {} history entries", self.entries.len());
        self.entries.clear();
    }

    /// The most recent entries, oldest first.
    pub fn recent(&self) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(self.display_limit);
        &self.entries[start..]
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the one-line summary stored in the history.
pub fn format_summary(
    prefix: &str,
    operation: Operation,
    result: &AggregationResult,
    style: DecimalStyle,
) -> String {
    format!(
        "Prefix: '{}', Objects: {}, Operation: '{}', Result: {}",
        prefix,
        result.matched_count,
        operation.code(),
        style.format(result.value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::models::{Dimensions, Entity};

    fn create_test_result(value: f64, count: usize) -> AggregationResult {
        AggregationResult {
            value,
            matched_count: count,
            matched_entities: (0..count)
                .map(|i| Entity::new(format!("Box{}", i), Dimensions::new(1.0, 1.0, 1.0)))
                .collect(),
        }
    }

    #[test]
    fn test_record_appends_formatted_entry() {
        let mut history = History::default();
        let result = create_test_result(12.5, 3);

        let entry = history.record("Box", Operation::AreaXY, &result, DecimalStyle::Dot);

        assert_eq!(
            entry.summary,
            "Prefix: 'Box', Objects: 3, Operation: 'AREA_XY', Result: 12.50"
        );
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0], entry);
    }

    #[test]
    fn test_record_with_comma() {
        let mut history = History::default();
        let entry = history.record(
            "Wall",
            Operation::MaxDimension,
            &create_test_result(12.5, 1),
            DecimalStyle::Comma,
        );
        assert_eq!(
            entry.to_string(),
            "Prefix: 'Wall', Objects: 1, Operation: 'BIGGEST', Result: 12,50"
        );
    }

    #[test]
    fn test_record_empty_match() {
        let mut history = History::default();
        let result = aggregate(&[], "Nothing", Operation::SumZ);
        let entry = history.record("Nothing", Operation::SumZ, &result, DecimalStyle::Dot);
        assert_eq!(
            entry.summary,
            "Prefix: 'Nothing', Objects: 0, Operation: 'Z', Result: 0.00"
        );
    }

    #[test]
    fn test_recent_is_bounded() {
        let mut history = History::default();
        for i in 0..8 {
            history.record(&format!("P{}", i), Operation::SumX, &create_test_result(1.0, 1), DecimalStyle::Dot);
        }

        assert_eq!(history.len(), 8);
        let recent = history.recent();
        assert_eq!(recent.len(), DEFAULT_DISPLAY_LIMIT);
        assert!(recent[0].summary.starts_with("Prefix: 'P3'"));
        assert!(recent[4].summary.starts_with("Prefix: 'P7'"));
    }

    #[test]
    fn test_recent_with_custom_limit() {
        let mut history = History::new(2);
        history.record("A", Operation::SumX, &create_test_result(1.0, 1), DecimalStyle::Dot);
        assert_eq!(history.recent().len(), 1);

        history.record("B", Operation::SumX, &create_test_result(1.0, 1), DecimalStyle::Dot);
        history.record("C", Operation::SumX, &create_test_result(1.0, 1), DecimalStyle::Dot);
        let recent: Vec<_> = history.recent().iter().map(|e| e.summary.clone()).collect();
        assert_eq!(recent.len(), 2);
        assert!(recent[1].starts_with("Prefix: 'C'"));
    }

    #[test]
    fn test_clear() {
        let mut history = History::default();
        history.clear();
        assert!(history.is_empty());

        for _ in 0..3 {
            history.record("Box", Operation::SumY, &create_test_result(2.0, 2), DecimalStyle::Dot);
        }
        history.clear();
        assert!(history.is_empty());
        assert!(history.recent().is_empty());
    }
}
