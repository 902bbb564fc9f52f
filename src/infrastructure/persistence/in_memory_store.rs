use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::ports::store::{AuditLogStore, AuditRecord, SelectionStore, StoreError};

/// In-memory store for tests and runs without a database.
pub struct InMemoryStore {
    selections: Mutex<HashMap<i64, String>>,
    audit: Mutex<Vec<AuditRecord>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selections: Mutex::new(HashMap::new()),
            audit: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore for InMemoryStore {
    fn get_selection(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        Ok(self
            .selections
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .get(&chat_id)
            .cloned())
    }

    fn set_selection(&self, chat_id: i64, target_key: &str) -> Result<(), StoreError> {
        self.selections
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .insert(chat_id, target_key.to_string());
        Ok(())
    }
}

impl AuditLogStore for InMemoryStore {
    fn log_action(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.audit
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }

    fn recent_actions(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        let audit = self
            .audit
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }
}
