//! Goal model - top-level objective made of milestones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::{GoalId, MilestoneId, TrackerId};
use crate::milestone::Milestone;
use crate::tracker::Tracker;

/// A goal the user is working toward.
///
/// Goals carry no status of their own; completion is always computed from
/// the milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    #[serde(alias = "goal_id")]
    pub id: GoalId,

    /// What the user wants to achieve
    pub what: String,

    /// Target date or horizon, free text
    pub when: String,

    /// Motivation
    pub why: String,

    /// Milestones in authoring order
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl Goal {
    /// Create a goal with no milestones.
    pub fn new(
        id: impl Into<GoalId>,
        what: impl Into<String>,
        when: impl Into<String>,
        why: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            what: what.into(),
            when: when.into(),
            why: why.into(),
            milestones: Vec::new(),
        }
    }

    /// Append a milestone.
    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }

    /// Look up a milestone by id.
    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }

    /// Look up a tracker anywhere in the goal.
    pub fn tracker(&self, id: &TrackerId) -> Option<&Tracker> {
        self.milestones.iter().find_map(|m| m.tracker(id))
    }

    /// Record a log entry and return the goal with the new tracker in place.
    ///
    /// The receiver is not modified; the returned goal is a complete new
    /// snapshot suitable for publishing.
    pub fn append_log(&self, tracker_id: &TrackerId, date: NaiveDate, value: f64) -> Result<Goal> {
        let (mi, ti) = self
            .milestones
            .iter()
            .enumerate()
            .find_map(|(mi, m)| m.trackers.iter().position(|t| &t.id == tracker_id).map(|ti| (mi, ti)))
            .ok_or_else(|| Error::UnknownTracker(tracker_id.clone()))?;

        let updated = self.milestones[mi].trackers[ti].append(date, value)?;

        let mut next = self.clone();
        next.milestones[mi].trackers[ti] = updated;
        Ok(next)
    }
}
