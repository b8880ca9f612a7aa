//! Goalpost core data models.
//!
//! Goals, milestones and trackers as supplied by the authoring side, plus
//! the log store that is the only thing the engine ever writes.

#![warn(missing_docs)]

// Core identities
mod id;
mod error;

// Goal structure
mod goal;
mod milestone;
mod tracker;

// Observations
mod log;

// Re-exports
pub use id::*;
pub use error::{Error, Result};

pub use goal::Goal;
pub use milestone::{Milestone, MilestoneStatus};
pub use tracker::{Cadence, MetricKind, SuccessLogic, TargetRange, Tracker};
pub use log::{LogEntry, LogStore};
