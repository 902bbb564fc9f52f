use anyhow::Context;

use crate::domain::ports::store::AuditLogStore;
use crate::presentation::cli::formatters::table_fmt::format_audit_table;

/// Print the most recent operator actions, newest first.
///
/// # Errors
///
/// Returns an error if the audit log cannot be read or serialized.
pub fn run_audit(store: &dyn AuditLogStore, limit: usize, json: bool) -> anyhow::Result<()> {
    let records = store
        .recent_actions(limit)
        .context("Failed to read the audit log")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No recorded actions.");
        return Ok(());
    }
    println!("{}", format_audit_table(&records));
    Ok(())
}
