use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, trimmed.
    #[must_use]
    pub fn combined(&self) -> String {
        let joined = if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout.trim_end(), self.stderr)
        };
        joined.trim().to_string()
    }
}

/// Run a program without a shell, killing it if `timeout` elapses.
///
/// # Errors
///
/// Returns `CommandError` if the program is missing, cannot be started, or times out.
/// A non-zero exit status is not an error; inspect [`CommandOutput::success`].
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    tracing::debug!(program, ?args, "Running command");
    let child = tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, child).await {
        Err(_) => Err(CommandError::Timeout(timeout)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CommandError::NotFound(program.to_string()))
        }
        Ok(Err(e)) => Err(CommandError::Launch {
            program: program.to_string(),
            reason: e.to_string(),
        }),
        Ok(Ok(output)) => Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
    }
}

/// Keep the first `max_chars` characters, marking the cut.
#[must_use]
pub fn truncate_output(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_owned()
    } else {
        let mut result: String = s.chars().take(max_chars).collect();
        result.push_str("\n... [truncated]");
        result
    }
}

/// Keep the last `max_chars` characters; used for logs where the newest lines matter.
#[must_use]
pub fn keep_tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_owned()
    } else {
        let mut result = String::from("[truncated] ...\n");
        result.extend(s.chars().skip(count - max_chars));
        result
    }
}
