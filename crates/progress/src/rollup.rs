//! Goal-level completion summary.

use goalpost_core::{Goal, GoalId, MilestoneId, MilestoneStatus, Result};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::resolve::{DependencyResolver, MilestoneState};

/// Completion summary of a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSummary {
    /// Goal summarized
    pub goal: GoalId,

    /// Milestones resolving to completed
    pub completed_count: usize,

    /// Milestones that count toward completion (archived ones excluded)
    pub total_count: usize,

    /// Archived milestones, reported apart from the rest
    pub archived_count: usize,

    /// `completed_count / total_count`, 0 for an empty goal
    pub percent_complete: f64,

    /// Unlocked and still pending, in goal order
    pub next_actionable: Vec<MilestoneId>,

    /// Trackers satisfied but waiting on a prerequisite
    pub blocked: Vec<MilestoneId>,

    /// Per-milestone derived state, in goal order
    pub milestones: Vec<MilestoneState>,
}

impl GoalSummary {
    /// Whether every non-archived milestone is completed.
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }
}

/// Summarize `goal`.
///
/// A cyclic or dangling dependency anywhere in the goal fails the whole
/// summary rather than producing a partial one.
pub fn summarize(goal: &Goal, config: &EngineConfig) -> Result<GoalSummary> {
    let states = DependencyResolver::new(goal, config)?.resolve_all()?;

    let mut completed_count = 0;
    let mut archived_count = 0;
    let mut next_actionable = Vec::new();
    let mut blocked = Vec::new();

    for state in &states {
        match state.status {
            MilestoneStatus::Completed => completed_count += 1,
            MilestoneStatus::Archived => archived_count += 1,
            MilestoneStatus::Pending => {
                if state.unlocked {
                    next_actionable.push(state.milestone.clone());
                } else if state.trackers_satisfied {
                    blocked.push(state.milestone.clone());
                }
            }
        }
    }

    let total_count = states.len() - archived_count;
    let percent_complete = if total_count > 0 {
        completed_count as f64 / total_count as f64
    } else {
        0.0
    };

    tracing::debug!(
        goal = %goal.id,
        completed_count,
        total_count,
        archived_count,
        "goal summarized"
    );

    Ok(GoalSummary {
        goal: goal.id.clone(),
        completed_count,
        total_count,
        archived_count,
        percent_complete,
        next_actionable,
        blocked,
        milestones: states,
    })
}
