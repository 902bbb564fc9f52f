use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::report::ActionStatus;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// Operator action recorded for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    /// Chat user id of the operator; 0 for the local CLI.
    pub operator_id: i64,
    pub action: String,
    pub target: String,
    pub status: ActionStatus,
    pub details: Option<String>,
}

/// Per-conversation active target, kept across restarts.
pub trait SelectionStore: Send + Sync {
    /// Stored target key for a chat, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn get_selection(&self, chat_id: i64) -> Result<Option<String>, StoreError>;

    /// Store the active target key for a chat.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write operation fails.
    fn set_selection(&self, chat_id: i64, target_key: &str) -> Result<(), StoreError>;
}

pub trait AuditLogStore: Send + Sync {
    /// Append an audit record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write operation fails.
    fn log_action(&self, record: &AuditRecord) -> Result<(), StoreError>;

    /// Most recent records, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn recent_actions(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError>;
}
