use anyhow::Context;

use crate::application::services::actions::{restart_and_verify, ActionContext};

/// Operator id recorded for actions taken from the local command line.
pub const LOCAL_OPERATOR_ID: i64 = 0;

/// Restart a target from the terminal; the outcome goes through the context's
/// notifier and into the audit log like a button press would.
///
/// # Errors
///
/// Returns an error if the target key is unknown.
pub async fn run_restart(ctx: &ActionContext, key: &str) -> anyhow::Result<()> {
    let target = ctx.targets.get(key).cloned().with_context(|| {
        format!(
            "Unknown target '{key}', available: {}",
            ctx.targets.keys().join(", ")
        )
    })?;

    println!("Restarting {} ({})...", target.key, target.service);
    restart_and_verify(ctx, &target, LOCAL_OPERATOR_ID).await;
    Ok(())
}
