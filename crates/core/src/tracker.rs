//! Tracker model - a measurable habit with its own log history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::TrackerId;
use crate::log::{LogEntry, LogStore};

/// A single metric the user logs against, with a target and a success rule.
///
/// The current value is always derived from `logs`; a cached `current_value`
/// in a stored record is dropped on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    /// Unique identifier
    #[serde(alias = "tracker_id")]
    pub id: TrackerId,

    /// How logs reduce to one value
    #[serde(alias = "aggregation_strategy")]
    pub metric_kind: MetricKind,

    /// Display unit
    #[serde(default)]
    pub unit: String,

    /// Question asked when logging
    #[serde(default, alias = "log_prompt")]
    pub prompt: String,

    /// Acceptable values
    pub target_range: TargetRange,

    /// Expected reporting period
    #[serde(default)]
    pub cadence: Cadence,

    /// Overrides the cadence-implied window length
    #[serde(default, alias = "window_num_days")]
    pub window_days: Option<u32>,

    /// When the tracker counts as satisfied
    pub success_logic: SuccessLogic,

    /// Logged observations
    #[serde(default)]
    pub logs: LogStore,
}

impl Tracker {
    /// Create a tracker with no logs, a one-off cadence and empty labels.
    pub fn new(
        id: impl Into<TrackerId>,
        metric_kind: MetricKind,
        target_range: TargetRange,
        success_logic: SuccessLogic,
    ) -> Self {
        Self {
            id: id.into(),
            metric_kind,
            unit: String::new(),
            prompt: String::new(),
            target_range,
            cadence: Cadence::Once,
            window_days: None,
            success_logic,
            logs: LogStore::new(),
        }
    }

    /// Set the cadence.
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set an explicit window length in days.
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = Some(days);
        self
    }

    /// Set the display unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the logging prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Replace the logs wholesale.
    pub fn with_logs(mut self, logs: LogStore) -> Self {
        self.logs = logs;
        self
    }

    /// Record `value` for `date`, returning the updated tracker.
    ///
    /// The receiver is left untouched so readers holding it keep a
    /// consistent view. An existing entry for `date` is overwritten.
    pub fn append(&self, date: NaiveDate, value: f64) -> Result<Tracker> {
        self.validate_value(date, value)?;

        let mut next = self.clone();
        let replaced = next.logs.insert(date, value);
        tracing::debug!(
            tracker = %self.id,
            %date,
            value,
            ?replaced,
            "log entry recorded"
        );
        Ok(next)
    }

    fn validate_value(&self, date: NaiveDate, value: f64) -> Result<()> {
        let reason = if !value.is_finite() {
            Some("value must be a finite number")
        } else if self.metric_kind == MetricKind::Boolean && value != 0.0 && value != 1.0 {
            Some("boolean trackers accept only 0 or 1")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidValue {
                tracker: self.id.clone(),
                date,
                value,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Date of the most recent log entry.
    pub fn last_log_date(&self) -> Option<NaiveDate> {
        self.logs.latest().map(|e| e.date)
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        self.logs.recent(n)
    }
}

/// How a tracker's logs reduce to a single current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    /// Sum of values in the window
    Sum,
    /// Most recent value in the window
    Latest,
    /// Most recent 0/1 value in the window
    Boolean,
    /// Smallest value in the window
    Min,
    /// Largest value in the window
    Max,
    /// Arithmetic mean of values in the window
    Mean,
}

/// Expected reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    /// Every day
    Daily,
    /// Every seven days
    Weekly,
    /// Every month
    Monthly,
    /// No recurring period
    #[default]
    Once,
}

/// The rule deciding whether a tracker is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuccessLogic {
    /// At least `threshold` consecutive met periods, ending at the latest one
    Streak {
        /// Required run length
        #[serde(alias = "count")]
        threshold: u32,
    },
    /// At least `threshold` met entries over all history
    TotalCount {
        /// Required number of met entries
        #[serde(alias = "count")]
        threshold: u32,
    },
    /// The current value is in range and reaches `threshold`
    Achieved {
        /// Value to reach
        #[serde(alias = "count")]
        threshold: f64,
    },
}

/// Inclusive `[min, max]` range with optional open ends.
///
/// Serialized as a two element array, `null` marking an open side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(Option<f64>, Option<f64>)", into = "(Option<f64>, Option<f64>)")]
pub struct TargetRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl TargetRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::InvalidRange { min: lo, max: hi });
            }
        }
        Ok(Self { min, max })
    }

    /// Range with only a lower bound.
    pub fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    /// Range with only an upper bound.
    pub fn at_most(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    /// Range accepting every value.
    pub fn unbounded() -> Self {
        Self { min: None, max: None }
    }

    /// Lower bound.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }
}

impl TryFrom<(Option<f64>, Option<f64>)> for TargetRange {
    type Error = Error;

    fn try_from((min, max): (Option<f64>, Option<f64>)) -> Result<Self> {
        Self::new(min, max)
    }
}

impl From<TargetRange> for (Option<f64>, Option<f64>) {
    fn from(range: TargetRange) -> Self {
        (range.min, range.max)
    }
}
