//! Storage trait abstraction.

use async_trait::async_trait;
use chrono::NaiveDate;
use goalpost_core::{Goal, GoalId, TrackerId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The goal tree or submitted value was rejected
    #[error(transparent)]
    Engine(#[from] goalpost_core::Error),

    /// Id that cannot be used as a file name
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Persistence boundary for goal trees.
///
/// The engine never creates or deletes structure on its own; these calls
/// exist for the authoring and ingestion sides.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Save a goal (create or replace).
    async fn save_goal(&mut self, goal: &Goal) -> Result<()>;

    /// Load a goal by ID.
    async fn load_goal(&self, id: &GoalId) -> Result<Option<Goal>>;

    /// List all goals.
    async fn list_goals(&self) -> Result<Vec<Goal>>;

    /// Delete a goal.
    async fn delete_goal(&mut self, id: &GoalId) -> Result<()>;

    /// Append a log entry to a tracker of a stored goal and persist it.
    ///
    /// Nothing is written when the value is rejected.
    async fn append_log(
        &mut self,
        goal_id: &GoalId,
        tracker_id: &TrackerId,
        date: NaiveDate,
        value: f64,
    ) -> Result<Goal> {
        let goal = self
            .load_goal(goal_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("goal {goal_id}")))?;
        let next = goal.append_log(tracker_id, date, value)?;
        self.save_goal(&next).await?;
        Ok(next)
    }
}
