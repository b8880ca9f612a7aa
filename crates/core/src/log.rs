//! Log store - one tracker's dated observations.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEntry {
    /// Calendar date the observation belongs to
    pub date: NaiveDate,

    /// Observed value
    pub value: f64,
}

impl LogEntry {
    /// Create a new entry.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Date-keyed observations, always ordered by date.
///
/// Serializes as `{"YYYY-MM-DD": value, ...}`. One value per date; a later
/// write for the same date replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogStore {
    entries: BTreeMap<NaiveDate, f64>,
}

impl LogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` for `date`, returning the value it replaced.
    pub(crate) fn insert(&mut self, date: NaiveDate, value: f64) -> Option<f64> {
        self.entries.insert(date, value)
    }

    /// Value logged for `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries.get(&date).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = LogEntry> + '_ {
        self.entries.iter().map(|(&date, &value)| LogEntry { date, value })
    }

    /// Entries whose date falls in `dates`, oldest first.
    pub fn range(&self, dates: RangeInclusive<NaiveDate>) -> impl DoubleEndedIterator<Item = LogEntry> + '_ {
        self.entries.range(dates).map(|(&date, &value)| LogEntry { date, value })
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<LogEntry> {
        self.iter().next_back()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        self.iter().rev().take(n).collect()
    }
}

impl FromIterator<(NaiveDate, f64)> for LogStore {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_out_of_order_load_is_sorted() {
        let logs: LogStore =
            serde_json::from_str(r#"{"2024-01-21": 10, "2024-01-19": 3, "2024-01-20": 15}"#).unwrap();
        let dates: Vec<_> = logs.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d("2024-01-19"), d("2024-01-20"), d("2024-01-21")]);
        assert_eq!(logs.latest().map(|e| e.value), Some(10.0));
    }

    #[test]
    fn test_wire_shape_round_trips() {
        let raw = r#"{"2024-01-20":15.0,"2024-01-21":10.5}"#;
        let logs: LogStore = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&logs).unwrap(), raw);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let logs: LogStore = [(d("2024-01-01"), 1.0), (d("2024-01-02"), 2.0), (d("2024-01-03"), 3.0)]
            .into_iter()
            .collect();
        let recent: Vec<_> = logs.recent(2).iter().map(|e| e.value).collect();
        assert_eq!(recent, vec![3.0, 2.0]);
        assert_eq!(logs.recent(10).len(), 3);
    }

    #[test]
    fn test_range_is_inclusive() {
        let logs: LogStore = [(d("2024-01-01"), 1.0), (d("2024-01-05"), 5.0), (d("2024-01-09"), 9.0)]
            .into_iter()
            .collect();
        let values: Vec<_> = logs.range(d("2024-01-01")..=d("2024-01-05")).map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 5.0]);
    }
}
