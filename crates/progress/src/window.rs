//! Active windows and cadence periods.
//!
//! Periods are fixed-length spans counted back from the evaluation date:
//! period 0 is the active window `[today - (len - 1), today]`, period 1 the
//! span before it, and so on. Entries dated after `today` fall in negative
//! periods. Trackers with a `ONCE` cadence and no explicit window have no
//! period length; every entry is then its own period.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use goalpost_core::{Cadence, LogEntry, Tracker};

use crate::config::EngineConfig;

/// Period length in days for a tracker, `None` meaning all time.
pub fn period_days(tracker: &Tracker, config: &EngineConfig) -> Option<u32> {
    if let Some(days) = tracker.window_days {
        return Some(days.max(1));
    }

    match tracker.cadence {
        Cadence::Daily => Some(1),
        Cadence::Weekly => Some(config.week_days.max(1)),
        Cadence::Monthly => Some(config.month_days.max(1)),
        Cadence::Once => None,
    }
}

/// The span the aggregator reduces over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Every entry ever logged
    AllTime,
    /// Inclusive trailing span ending at the evaluation date
    Trailing {
        /// First day in the window
        start: NaiveDate,
        /// Last day in the window
        end: NaiveDate,
    },
}

impl Window {
    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Window::AllTime => true,
            Window::Trailing { start, end } => start <= date && date <= end,
        }
    }

    /// Entries of `tracker` inside the window, oldest first.
    pub fn entries(&self, tracker: &Tracker) -> Vec<LogEntry> {
        match *self {
            Window::AllTime => tracker.logs.iter().collect(),
            Window::Trailing { start, end } => tracker.logs.range(start..=end).collect(),
        }
    }
}

/// The tracker's active window as of the configured date.
pub fn active_window(tracker: &Tracker, config: &EngineConfig) -> Window {
    match period_days(tracker, config) {
        None => Window::AllTime,
        Some(days) => {
            let end = config.today();
            let start = end
                .checked_sub_days(Days::new(u64::from(days) - 1))
                .unwrap_or(NaiveDate::MIN);
            Window::Trailing { start, end }
        }
    }
}

/// Entries grouped into one cadence period.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// Periods back from the active window; 0 is the active window
    pub index: i64,

    /// Entries in the period, oldest first
    pub entries: Vec<LogEntry>,
}

/// All periods that contain at least one entry, most recent first.
pub fn periods(tracker: &Tracker, config: &EngineConfig) -> Vec<Period> {
    let Some(days) = period_days(tracker, config) else {
        return tracker
            .logs
            .iter()
            .rev()
            .zip(0..)
            .map(|(entry, index)| Period {
                index,
                entries: vec![entry],
            })
            .collect();
    };

    let today = config.today();
    let len = i64::from(days);
    let mut grouped: BTreeMap<i64, Vec<LogEntry>> = BTreeMap::new();
    for entry in tracker.logs.iter() {
        let index = (today - entry.date).num_days().div_euclid(len);
        grouped.entry(index).or_default().push(entry);
    }

    grouped
        .into_iter()
        .map(|(index, entries)| Period { index, entries })
        .collect()
}
