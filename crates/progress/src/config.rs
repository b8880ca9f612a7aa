//! Engine configuration.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Settings shared by every evaluation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Date treated as "now"; `None` uses today's UTC date
    pub as_of: Option<NaiveDate>,

    /// Length of a weekly period in days
    pub week_days: u32,

    /// Length of a monthly period in days
    pub month_days: u32,
}

impl EngineConfig {
    /// Config evaluating as of a fixed date.
    pub fn as_of(date: NaiveDate) -> Self {
        Self {
            as_of: Some(date),
            ..Self::default()
        }
    }

    /// The date windows end on.
    pub fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Copy with `as_of` fixed, so one evaluation pass never straddles midnight.
    pub fn pinned(&self) -> Self {
        Self {
            as_of: Some(self.today()),
            ..*self
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            week_days: 7,
            month_days: 30,
        }
    }
}
