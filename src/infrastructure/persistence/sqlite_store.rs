use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::report::ActionStatus;
use crate::domain::ports::store::{AuditLogStore, AuditRecord, SelectionStore, StoreError};

use super::migrations;

/// SQLite-backed store for chat selections and the audit log.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at an already expanded path.
    ///
    /// Creates parent directories, sets WAL mode and pragmas, and initializes schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the database cannot be opened or initialized.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        let conn =
            Connection::open(db_path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        migrations::initialize_schema(&conn).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))
    }

    /// Remove audit records older than the given retention period.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if deletion fails.
    pub fn cleanup_old(&self, retention_days: u64) -> Result<usize, StoreError> {
        let days =
            i64::try_from(retention_days).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let delta = chrono::TimeDelta::try_days(days)
            .ok_or_else(|| StoreError::WriteFailed("invalid retention days".into()))?;
        let cutoff = (Utc::now() - delta).to_rfc3339();

        self.conn()?
            .execute("DELETE FROM audit_log WHERE logged_at < ?1", params![cutoff])
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }
}

impl SelectionStore for SqliteStore {
    fn get_selection(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT target_key FROM selections WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))
    }

    fn set_selection(&self, chat_id: i64, target_key: &str) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "INSERT INTO selections (chat_id, target_key, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET target_key = excluded.target_key,
                                                    updated_at = excluded.updated_at",
                params![chat_id, target_key, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}

fn parse_audit_row(row: &rusqlite::Row<'_>) -> Result<AuditRecord, rusqlite::Error> {
    let logged_at: String = row.get(0)?;
    let status_str: String = row.get(4)?;

    let timestamp = DateTime::parse_from_rfc3339(&logged_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let status: ActionStatus = serde_json::from_str(&format!("\"{status_str}\"")).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(AuditRecord {
        timestamp,
        operator_id: row.get(1)?,
        action: row.get(2)?,
        target: row.get(3)?,
        status,
        details: row.get(5)?,
    })
}

impl AuditLogStore for SqliteStore {
    fn log_action(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "INSERT INTO audit_log (logged_at, operator_id, action, target, status, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.timestamp.to_rfc3339(),
                    record.operator_id,
                    record.action,
                    record.target,
                    record.status.to_string(),
                    record.details,
                ],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    fn recent_actions(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT logged_at, operator_id, action, target, status, details
                 FROM audit_log ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit], parse_audit_row)
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))
    }
}
