use std::path::{Path, PathBuf};

use crate::inference::Insights;

/// State that outlives a single capture: the last successful inference and the
/// snapshot it was computed from. Both are set together or not at all.
#[derive(Debug, Clone, Default)]
pub struct Session {
    last_insights: Option<Insights>,
    last_snapshot_path: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called at the start of every capture trigger.
    pub fn reset(&mut self) {
        self.last_insights = None;
        self.last_snapshot_path = None;
    }

    pub fn record(&mut self, insights: Insights, snapshot: PathBuf) {
        self.last_insights = Some(insights);
        self.last_snapshot_path = Some(snapshot);
    }

    pub fn last_insights(&self) -> Option<&Insights> {
        self.last_insights.as_ref()
    }

    pub fn last_snapshot_path(&self) -> Option<&Path> {
        self.last_snapshot_path.as_deref()
    }

    /// The result to redisplay when the UI re-renders without a new capture.
    pub fn latest(&self) -> Option<(&Insights, &Path)> {
        match (&self.last_insights, &self.last_snapshot_path) {
            (Some(insights), Some(path)) => Some((insights, path.as_path())),
            _ => None,
        }
    }
}
