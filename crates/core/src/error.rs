//! Errors raised by the progress engine.

use chrono::NaiveDate;

use crate::id::{GoalId, MilestoneId, TrackerId};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural and validation errors.
///
/// None of these are transient: each one is fixed by correcting the goal
/// tree or the submitted value, never by retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A logged value is not acceptable for the tracker's metric kind
    #[error("invalid value {value} for tracker '{tracker}' on {date}: {reason}")]
    InvalidValue {
        /// Tracker the value was submitted to
        tracker: TrackerId,
        /// Date of the rejected entry
        date: NaiveDate,
        /// Rejected value
        value: f64,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A target range whose lower bound exceeds its upper bound
    #[error("invalid target range: min {min} exceeds max {max}")]
    InvalidRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// The depends_on graph of a goal contains a cycle
    #[error("circular dependency between milestones: {}", join_ids(.ids))]
    CyclicDependency {
        /// Milestones forming the cycle, in traversal order
        ids: Vec<MilestoneId>,
    },

    /// A depends_on entry names a milestone absent from the goal
    #[error("milestone '{milestone}' depends on unknown milestone '{missing}'")]
    UnknownReference {
        /// Milestone holding the dangling reference
        milestone: MilestoneId,
        /// Id that could not be found
        missing: MilestoneId,
    },

    /// Two milestones of one goal share an id
    #[error("duplicate milestone id '{0}'")]
    DuplicateMilestone(MilestoneId),

    /// No tracker with this id exists in the goal
    #[error("unknown tracker '{0}'")]
    UnknownTracker(TrackerId),

    /// No goal with this id is known
    #[error("unknown goal '{0}'")]
    UnknownGoal(GoalId),

    /// No milestone with this id exists in the goal
    #[error("unknown milestone '{0}'")]
    UnknownMilestone(MilestoneId),
}

fn join_ids(ids: &[MilestoneId]) -> String {
    ids.iter()
        .map(MilestoneId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
