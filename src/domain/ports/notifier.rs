use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::report::ActionReport;
use crate::domain::value_objects::alert_action::AlertAction;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),
}

/// Delivers messages to the fixed operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an alert with its recovery actions attached.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the message was not delivered. Callers
    /// rely on this to decide whether the alert counts as sent.
    async fn notify_alert(
        &self,
        alert: &CandidateAlert,
        actions: &[AlertAction],
    ) -> Result<(), NotificationError>;

    /// Report the outcome of a recovery action.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the report was not delivered.
    async fn notify_action_result(&self, report: &ActionReport) -> Result<(), NotificationError>;
}
