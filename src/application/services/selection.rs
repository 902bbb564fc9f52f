use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::target::{Target, TargetSet};
use crate::domain::ports::store::{SelectionStore, StoreError};

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("unknown target '{key}', available: {available}")]
    UnknownTarget { key: String, available: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves the target a chat is working on.
pub struct TargetSelector {
    targets: Arc<TargetSet>,
    store: Arc<dyn SelectionStore>,
}

impl TargetSelector {
    #[must_use]
    pub fn new(targets: Arc<TargetSet>, store: Arc<dyn SelectionStore>) -> Self {
        Self { targets, store }
    }

    /// The stored selection, or the first target when none is stored or the stored
    /// key was removed from the configuration. The fallback is written back.
    #[must_use]
    pub fn active_target(&self, chat_id: i64) -> Target {
        let stored = match self.store.get_selection(chat_id) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(chat_id, "Failed to read selection: {e}");
                None
            }
        };

        if let Some(target) = stored.as_deref().and_then(|key| self.targets.get(key)) {
            return target.clone();
        }

        let fallback = self.targets.first().clone();
        if let Err(e) = self.store.set_selection(chat_id, &fallback.key) {
            tracing::warn!(chat_id, "Failed to store fallback selection: {e}");
        }
        fallback
    }

    /// # Errors
    ///
    /// Returns `SelectionError` if the key is not configured or the store write fails.
    pub fn set_active(&self, chat_id: i64, key: &str) -> Result<Target, SelectionError> {
        let target = self
            .targets
            .get(key)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownTarget {
                key: key.to_string(),
                available: self.targets.keys().join(", "),
            })?;
        self.store.set_selection(chat_id, &target.key)?;
        tracing::info!(chat_id, target = %target.key, "Active target changed");
        Ok(target)
    }
}
