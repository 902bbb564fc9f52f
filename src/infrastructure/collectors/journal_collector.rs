use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::log_source::{LogError, LogSource};
use crate::infrastructure::os::command::{keep_tail, run_command, CommandError};

/// Reads a unit's journal with `journalctl -u <unit> --no-pager`.
pub struct JournalctlLogSource {
    max_output_chars: usize,
}

impl JournalctlLogSource {
    #[must_use]
    pub const fn new(max_output_chars: usize) -> Self {
        Self { max_output_chars }
    }

    async fn query(&self, args: &[&str], timeout: Duration) -> Result<String, LogError> {
        let output = run_command("journalctl", args, timeout)
            .await
            .map_err(|e| match e {
                CommandError::Timeout(after) => LogError::Timeout(after),
                CommandError::NotFound(_) => LogError::Unavailable("journalctl not found".into()),
                CommandError::Launch { .. } => LogError::Unavailable(e.to_string()),
            })?;

        if !output.success {
            return Err(LogError::QueryFailed(format!(
                "journalctl exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }
        Ok(output.stdout.trim_end().to_string())
    }
}

fn tail_args(service: &str, lines: usize) -> Vec<String> {
    vec![
        "-u".into(),
        service.into(),
        "--no-pager".into(),
        "-n".into(),
        lines.to_string(),
    ]
}

fn since_args(service: &str, timeframe: &str) -> Vec<String> {
    vec![
        "-u".into(),
        service.into(),
        "--no-pager".into(),
        "--since".into(),
        timeframe.into(),
    ]
}

#[async_trait]
impl LogSource for JournalctlLogSource {
    /// Bounded by `lines`, so not truncated further.
    async fn tail(&self, service: &str, lines: usize, timeout: Duration) -> Result<String, LogError> {
        let args = tail_args(service, lines);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.query(&args, timeout).await
    }

    async fn since(
        &self,
        service: &str,
        timeframe: &str,
        timeout: Duration,
    ) -> Result<String, LogError> {
        let args = since_args(service, timeframe);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let text = self.query(&args, timeout).await?;
        Ok(keep_tail(&text, self.max_output_chars))
    }
}
