//! Milestone status derivation over the dependency graph.
//!
//! Milestones reference prerequisites by id. The resolver indexes a goal's
//! milestones once and walks `depends_on` edges iteratively, marking nodes
//! in-progress while their prerequisites are pending, so a back edge is
//! reported as a cycle instead of recursing forever.

use std::collections::HashMap;

use goalpost_core::{Error, Goal, MilestoneId, MilestoneStatus, Result};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::evaluate::evaluate;

/// Derived state of one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneState {
    /// Milestone described
    pub milestone: MilestoneId,

    /// Derived status; `Archived` is passed through unchanged
    pub status: MilestoneStatus,

    /// Every prerequisite resolves to completed
    pub unlocked: bool,

    /// Every attached tracker is satisfied
    pub trackers_satisfied: bool,
}

impl MilestoneState {
    /// Trackers are done but a prerequisite is not.
    pub fn is_blocked(&self) -> bool {
        self.status == MilestoneStatus::Pending && self.trackers_satisfied && !self.unlocked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Frame {
    node: usize,
    deps: Vec<usize>,
    next: usize,
}

/// Resolves milestone statuses for one goal snapshot.
pub struct DependencyResolver<'g> {
    goal: &'g Goal,
    index: HashMap<&'g MilestoneId, usize>,
    config: EngineConfig,
}

impl<'g> DependencyResolver<'g> {
    /// Index the milestones of `goal`, rejecting duplicate ids.
    pub fn new(goal: &'g Goal, config: &EngineConfig) -> Result<Self> {
        let mut index = HashMap::with_capacity(goal.milestones.len());
        for (i, milestone) in goal.milestones.iter().enumerate() {
            if index.insert(&milestone.id, i).is_some() {
                return Err(Error::DuplicateMilestone(milestone.id.clone()));
            }
        }

        Ok(Self {
            goal,
            index,
            config: config.pinned(),
        })
    }

    /// Derived status of a milestone.
    pub fn resolve(&self, id: &MilestoneId) -> Result<MilestoneStatus> {
        Ok(self.state(id)?.status)
    }

    /// Whether every prerequisite of a milestone resolves to completed.
    pub fn is_unlocked(&self, id: &MilestoneId) -> Result<bool> {
        Ok(self.state(id)?.unlocked)
    }

    /// Full derived state of a milestone.
    pub fn state(&self, id: &MilestoneId) -> Result<MilestoneState> {
        let node = self.lookup(id)?;
        let mut states = self.walk(std::iter::once(node))?;
        states
            .swap_remove(node)
            .ok_or_else(|| Error::UnknownMilestone(id.clone()))
    }

    /// Derived state of every milestone, in goal order.
    ///
    /// Fails as a whole if any part of the graph is cyclic or dangling.
    pub fn resolve_all(&self) -> Result<Vec<MilestoneState>> {
        let states = self.walk(0..self.goal.milestones.len())?;
        Ok(states.into_iter().flatten().collect())
    }

    fn lookup(&self, id: &MilestoneId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownMilestone(id.clone()))
    }

    /// Depth-first walk from `roots`, deriving each node after its prerequisites.
    fn walk(&self, roots: impl IntoIterator<Item = usize>) -> Result<Vec<Option<MilestoneState>>> {
        let n = self.goal.milestones.len();
        let mut marks = vec![Mark::Unvisited; n];
        let mut states: Vec<Option<MilestoneState>> = vec![None; n];
        let mut stack: Vec<Frame> = Vec::new();

        for root in roots {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            stack.push(self.enter(root)?);
            marks[root] = Mark::InProgress;

            while let Some(frame) = stack.last_mut() {
                if let Some(&dep) = frame.deps.get(frame.next) {
                    frame.next += 1;
                    match marks[dep] {
                        Mark::Done => {}
                        Mark::InProgress => return Err(self.cycle(&stack, dep)),
                        Mark::Unvisited => {
                            stack.push(self.enter(dep)?);
                            marks[dep] = Mark::InProgress;
                        }
                    }
                    continue;
                }

                let Some(frame) = stack.pop() else { break };
                let state = self.derive(frame.node, &frame.deps, &states);
                states[frame.node] = Some(state);
                marks[frame.node] = Mark::Done;
            }
        }

        Ok(states)
    }

    fn enter(&self, node: usize) -> Result<Frame> {
        let milestone = &self.goal.milestones[node];
        let deps = milestone
            .depends_on
            .iter()
            .map(|dep| {
                self.index.get(dep).copied().ok_or_else(|| Error::UnknownReference {
                    milestone: milestone.id.clone(),
                    missing: dep.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Frame { node, deps, next: 0 })
    }

    fn cycle(&self, stack: &[Frame], back_to: usize) -> Error {
        let start = stack.iter().position(|f| f.node == back_to).unwrap_or(0);
        let ids: Vec<MilestoneId> = stack[start..]
            .iter()
            .map(|f| self.goal.milestones[f.node].id.clone())
            .collect();

        tracing::warn!(goal = %self.goal.id, cycle = ?ids, "dependency cycle detected");
        Error::CyclicDependency { ids }
    }

    fn derive(&self, node: usize, deps: &[usize], states: &[Option<MilestoneState>]) -> MilestoneState {
        let milestone = &self.goal.milestones[node];

        let unlocked = deps.iter().all(|&d| {
            states[d]
                .as_ref()
                .is_some_and(|s| s.status == MilestoneStatus::Completed)
        });
        let trackers_satisfied = milestone.trackers.iter().all(|t| evaluate(t, &self.config));

        let status = match milestone.status {
            MilestoneStatus::Archived => MilestoneStatus::Archived,
            MilestoneStatus::Pending | MilestoneStatus::Completed => {
                if unlocked && trackers_satisfied {
                    MilestoneStatus::Completed
                } else {
                    MilestoneStatus::Pending
                }
            }
        };

        tracing::debug!(
            milestone = %milestone.id,
            %status,
            unlocked,
            trackers_satisfied,
            "milestone resolved"
        );

        MilestoneState {
            milestone: milestone.id.clone(),
            status,
            unlocked,
            trackers_satisfied,
        }
    }
}

/// Derived status of one milestone in `goal`.
pub fn resolve(goal: &Goal, id: &MilestoneId, config: &EngineConfig) -> Result<MilestoneStatus> {
    DependencyResolver::new(goal, config)?.resolve(id)
}

/// Whether every prerequisite of a milestone in `goal` is completed.
pub fn is_unlocked(goal: &Goal, id: &MilestoneId, config: &EngineConfig) -> Result<bool> {
    DependencyResolver::new(goal, config)?.is_unlocked(id)
}
