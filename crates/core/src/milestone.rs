//! Milestone model - a checkpoint gated by trackers and prerequisites.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{MilestoneId, TrackerId};
use crate::tracker::Tracker;

/// A named checkpoint within a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier within the goal
    #[serde(alias = "milestone_id")]
    pub id: MilestoneId,

    /// What reaching this milestone means
    pub statement: String,

    /// Stored status; only `Archived` is honored, the rest is re-derived
    #[serde(default)]
    pub status: MilestoneStatus,

    /// Prerequisite milestones in the same goal
    #[serde(default)]
    pub depends_on: BTreeSet<MilestoneId>,

    /// Trackers gating this milestone
    #[serde(default)]
    pub trackers: Vec<Tracker>,
}

impl Milestone {
    /// Create a pending milestone with no trackers or prerequisites.
    pub fn new(id: impl Into<MilestoneId>, statement: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            statement: statement.into(),
            status: MilestoneStatus::Pending,
            depends_on: BTreeSet::new(),
            trackers: Vec::new(),
        }
    }

    /// Add a prerequisite.
    pub fn requires(mut self, id: impl Into<MilestoneId>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    /// Attach a tracker.
    pub fn with_tracker(mut self, tracker: Tracker) -> Self {
        self.trackers.push(tracker);
        self
    }

    /// Mark as archived.
    pub fn archived(mut self) -> Self {
        self.status = MilestoneStatus::Archived;
        self
    }

    /// Whether an external archive marker is set.
    pub fn is_archived(&self) -> bool {
        self.status == MilestoneStatus::Archived
    }

    /// Look up an attached tracker.
    pub fn tracker(&self, id: &TrackerId) -> Option<&Tracker> {
        self.trackers.iter().find(|t| &t.id == id)
    }
}

/// Milestone status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    /// Not finished, or finished but still blocked
    #[default]
    Pending,
    /// Trackers satisfied and every prerequisite completed
    Completed,
    /// Set externally; never overwritten by the engine
    Archived,
}

impl MilestoneStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
