//! Progress Tracking
//!
//! Turns logged observations into tracker values, success decisions,
//! milestone statuses and goal summaries. Every stage is a pure function of
//! a goal snapshot and an [`EngineConfig`].

#![warn(missing_docs)]

pub mod config;
pub mod window;
pub mod aggregate;
pub mod evaluate;
pub mod resolve;
pub mod rollup;
pub mod board;

pub use config::EngineConfig;
pub use window::{active_window, period_days, periods, Period, Window};
pub use aggregate::aggregate;
pub use evaluate::{evaluate, met_entries, report, trailing_streak, TrackerReport};
pub use resolve::{is_unlocked, resolve, DependencyResolver, MilestoneState};
pub use rollup::{summarize, GoalSummary};
pub use board::GoalBoard;
