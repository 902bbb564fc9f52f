use std::time::Duration;

use async_trait::async_trait;

use super::command::{run_command, truncate_output, CommandError, CommandOutput};
use crate::domain::ports::service_manager::{ServiceError, ServiceManager};
use crate::domain::value_objects::service_state::ServiceState;

/// Drives units through `systemctl`. Restarts go through `sudo -n` when configured,
/// so a missing sudoers rule fails fast instead of waiting for a password.
pub struct SystemctlManager {
    use_sudo: bool,
    max_output_chars: usize,
}

impl SystemctlManager {
    #[must_use]
    pub const fn new(use_sudo: bool, max_output_chars: usize) -> Self {
        Self {
            use_sudo,
            max_output_chars,
        }
    }

    fn restart_command<'a>(&self, service: &'a str) -> (&'static str, Vec<&'a str>) {
        if self.use_sudo {
            ("sudo", vec!["-n", "systemctl", "restart", service])
        } else {
            ("systemctl", vec!["restart", service])
        }
    }
}

fn map_error(err: CommandError) -> ServiceError {
    match err {
        CommandError::Timeout(after) => ServiceError::Timeout(after),
        CommandError::NotFound(program) => {
            ServiceError::Unavailable(format!("{program} not found"))
        }
        CommandError::Launch { .. } => ServiceError::Unavailable(err.to_string()),
    }
}

fn exit_label(output: &CommandOutput) -> String {
    output
        .exit_code
        .map_or_else(|| "signal".to_string(), |c| format!("exit code {c}"))
}

#[async_trait]
impl ServiceManager for SystemctlManager {
    async fn query_active(
        &self,
        service: &str,
        timeout: Duration,
    ) -> Result<ServiceState, ServiceError> {
        // `is-active` exits non-zero for every state but active and still prints it.
        let output = run_command("systemctl", &["is-active", service], timeout)
            .await
            .map_err(map_error)?;
        Ok(ServiceState::parse(&output.stdout))
    }

    async fn restart(&self, service: &str, timeout: Duration) -> Result<String, ServiceError> {
        let (program, args) = self.restart_command(service);
        let output = run_command(program, &args, timeout)
            .await
            .map_err(map_error)?;
        let text = truncate_output(&output.combined(), self.max_output_chars);
        if output.success {
            tracing::info!(service, "Restart issued");
            Ok(text)
        } else {
            Err(ServiceError::CommandFailed(format!(
                "{}: {text}",
                exit_label(&output)
            )))
        }
    }

    async fn status(&self, service: &str, timeout: Duration) -> Result<String, ServiceError> {
        // Non-zero for stopped units too; the text is what the operator wants.
        let output = run_command("systemctl", &["status", "--no-pager", service], timeout)
            .await
            .map_err(map_error)?;
        Ok(truncate_output(&output.combined(), self.max_output_chars))
    }
}
