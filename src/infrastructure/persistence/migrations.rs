use rusqlite::Connection;

/// Initialize the database schema, creating tables if they don't exist.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS selections (
            chat_id     INTEGER PRIMARY KEY,
            target_key  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS audit_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            logged_at   TEXT    NOT NULL,
            operator_id INTEGER NOT NULL,
            action      TEXT    NOT NULL,
            target      TEXT    NOT NULL,
            status      TEXT    NOT NULL,
            details     TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_audit_log_logged_at ON audit_log(logged_at);",
    )?;
    Ok(())
}
