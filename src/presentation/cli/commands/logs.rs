use std::time::Duration;

use anyhow::Context;
use colored::Colorize;

use crate::domain::entities::target::Target;
use crate::domain::ports::log_source::LogSource;
use crate::infrastructure::notifications::terminal::sanitize;

/// Print the journal of a target: the last `lines` lines, or everything since
/// `since` when given.
///
/// # Errors
///
/// Returns an error if the log source fails or times out.
pub async fn run_logs(
    logs: &dyn LogSource,
    target: &Target,
    lines: usize,
    since: Option<&str>,
    timeout: Duration,
) -> anyhow::Result<()> {
    let text = match since {
        Some(timeframe) => logs.since(&target.service, timeframe, timeout).await,
        None => logs.tail(&target.service, lines.max(1), timeout).await,
    }
    .with_context(|| format!("Failed to read logs of {}", target.service))?;

    if text.trim().is_empty() {
        println!("{}", format!("No log lines for {}", target.service).dimmed());
    } else {
        println!("{}", sanitize(text.trim_end()));
    }
    Ok(())
}
