use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::TriageConfig;
use crate::{load_feedback, LoadedFeedback};

#[derive(Default)]
pub struct SourceCache {
    entries: RwLock<HashMap<PathBuf, Arc<LoadedFeedback>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(&self, config: &TriageConfig, now: NaiveDateTime) -> Arc<LoadedFeedback> {
        let key = config.source.path.clone();
        {
            let guard = self.entries.read().await;
            if let Some(entry) = guard.get(&key) {
                return entry.clone();
            }
        }

        let loaded = Arc::new(load_feedback(config, now));
        if loaded.source_error.is_none() {
            let mut guard = self.entries.write().await;
            guard.insert(key, loaded.clone());
        }
        loaded
    }

    pub async fn invalidate(&self) -> usize {
        let mut guard = self.entries.write().await;
        let dropped = guard.len();
        guard.clear();
        if dropped > 0 {
            info!(dropped, "source cache invalidated");
        }
        dropped
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
