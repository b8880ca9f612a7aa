//! JSON file storage implementation.
//!
//! Stores one goal tree per file under `goals/` and keeps a small meta marker
//! per goal (version + updated_at) under `meta/goals/`.

use std::path::{Path, PathBuf};

use goalpost_core::{Goal, GoalId};
use goalpost_progress::{aggregate, EngineConfig};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::{Result, Storage, StorageError};

/// Cached values closer than this to the derived value are not reported.
const CACHE_TOLERANCE: f64 = 1e-9;

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    config: EngineConfig,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directories it needs.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("goals")).await?;
        fs::create_dir_all(root.join("meta").join("goals")).await?;

        Ok(Self {
            root,
            config: EngineConfig::default(),
        })
    }

    /// Use `config` when checking cached values on load.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn goal_path(&self, id: &GoalId) -> Result<PathBuf> {
        Ok(self.root.join("goals").join(format!("{}.json", file_stem(id)?)))
    }

    fn meta_path(&self, id: &GoalId) -> Result<PathBuf> {
        Ok(self
            .root
            .join("meta")
            .join("goals")
            .join(format!("{}.meta.json", file_stem(id)?)))
    }

    /// Version of a stored goal; 0 if it was never saved.
    pub async fn version(&self, id: &GoalId) -> Result<u64> {
        let path = self.meta_path(id)?;
        match fs::read_to_string(&path).await {
            Ok(s) => {
                let meta: Value = serde_json::from_str(&s)?;
                Ok(meta.get("version").and_then(Value::as_u64).unwrap_or(0))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and increment per-goal version, return new version.
    async fn bump_version(&self, id: &GoalId) -> Result<u64> {
        let version = self.version(id).await? + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(self.meta_path(id)?, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    async fn read_goal(&self, path: &Path) -> Result<Option<Goal>> {
        let json = match fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let raw: Value = serde_json::from_str(&json)?;
        let goal: Goal = serde_json::from_value(raw.clone())?;
        self.check_cached_values(&raw, &goal);
        Ok(Some(goal))
    }

    /// Records written by older producers carry a `current_value` next to the
    /// logs. It is never used; a disagreement with the derived value is
    /// reported and the derived value stands.
    fn check_cached_values(&self, raw: &Value, goal: &Goal) {
        let trackers = raw
            .get("milestones")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|m| m.get("trackers").and_then(Value::as_array))
            .flatten();

        for record in trackers {
            let Some(cached) = record.get("current_value").and_then(Value::as_f64) else {
                continue;
            };
            let Some(id) = record
                .get("id")
                .or_else(|| record.get("tracker_id"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let Some(tracker) = goal.tracker(&id.into()) else {
                continue;
            };

            let derived = aggregate(tracker, &self.config);
            let agrees = derived.is_some_and(|v| (v - cached).abs() <= CACHE_TOLERANCE);
            if !agrees {
                warn!(
                    goal = %goal.id,
                    tracker = %tracker.id,
                    cached,
                    ?derived,
                    "stored current_value disagrees with logs; using derived value"
                );
            }
        }
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_goal(&mut self, goal: &Goal) -> Result<()> {
        let path = self.goal_path(&goal.id)?;
        let json = serde_json::to_string_pretty(goal)?;
        fs::write(&path, json.as_bytes()).await?;

        let version = self.bump_version(&goal.id).await?;
        debug!(goal = %goal.id, version, "goal saved");
        Ok(())
    }

    async fn load_goal(&self, id: &GoalId) -> Result<Option<Goal>> {
        self.read_goal(&self.goal_path(id)?).await
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut goals = Vec::new();
        let mut rd = fs::read_dir(self.root.join("goals")).await?;
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match self.read_goal(&path).await {
                Ok(Some(goal)) => goals.push(goal),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable goal"),
            }
        }
        goals.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(goals)
    }

    async fn delete_goal(&mut self, id: &GoalId) -> Result<()> {
        for path in [self.goal_path(id)?, self.meta_path(id)?] {
            fs::remove_file(path).await.or_else(|e| {
                if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
            })?;
        }
        Ok(())
    }
}

/// Goal ids become file names; anything that could escape the directory is refused.
fn file_stem(id: &GoalId) -> Result<&str> {
    let s = id.as_str();
    if s.is_empty() || s == "." || s == ".." || s.contains(['/', '\\']) {
        return Err(StorageError::InvalidId(s.to_string()));
    }
    Ok(s)
}
