//! Published goal snapshots.
//!
//! Readers take an `Arc<Goal>` once and compute against it; writers build a
//! new goal and swap it in. A reader never observes a half-applied append.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::NaiveDate;
use goalpost_core::{Error, Goal, GoalId, Result, TrackerId};

use crate::config::EngineConfig;
use crate::rollup::{summarize, GoalSummary};

type Snapshot = HashMap<GoalId, Arc<Goal>>;

/// Holds the current snapshot of every goal.
#[derive(Default)]
pub struct GoalBoard {
    snap: ArcSwap<Snapshot>,
}

impl GoalBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board holding `goals`.
    pub fn with_goals(goals: impl IntoIterator<Item = Goal>) -> Self {
        let snap: Snapshot = goals
            .into_iter()
            .map(|g| (g.id.clone(), Arc::new(g)))
            .collect();
        Self {
            snap: ArcSwap::from_pointee(snap),
        }
    }

    /// Current snapshot of one goal.
    pub fn get(&self, id: &GoalId) -> Option<Arc<Goal>> {
        self.snap.load().get(id).cloned()
    }

    /// Ids of every goal on the board.
    pub fn goal_ids(&self) -> Vec<GoalId> {
        let mut ids: Vec<GoalId> = self.snap.load().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Publish a goal as supplied by the authoring side, replacing any
    /// previous version.
    pub fn publish(&self, goal: Goal) {
        let goal = Arc::new(goal);
        self.snap.rcu(|cur| {
            let mut next = Snapshot::clone(cur);
            next.insert(goal.id.clone(), Arc::clone(&goal));
            next
        });
    }

    /// Append a log entry and publish the resulting goal.
    ///
    /// Concurrent appends are applied one after another in publication
    /// order; for the same tracker and date the last one published wins.
    pub fn append_log(
        &self,
        goal_id: &GoalId,
        tracker_id: &TrackerId,
        date: NaiveDate,
        value: f64,
    ) -> Result<Arc<Goal>> {
        loop {
            let cur = self.snap.load_full();
            let goal = cur.get(goal_id).ok_or_else(|| Error::UnknownGoal(goal_id.clone()))?;
            let updated = Arc::new(goal.append_log(tracker_id, date, value)?);

            let mut next = Snapshot::clone(&cur);
            next.insert(goal_id.clone(), Arc::clone(&updated));

            let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
            if Arc::ptr_eq(&prev, &cur) {
                return Ok(updated);
            }
            tracing::trace!(goal = %goal_id, "snapshot changed during append, retrying");
        }
    }

    /// Summarize the current snapshot of a goal.
    pub fn summarize(&self, id: &GoalId, config: &EngineConfig) -> Option<Result<GoalSummary>> {
        let goal = self.get(id)?;
        Some(summarize(&goal, config))
    }
}
