use async_trait::async_trait;

use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::report::ActionReport;
use crate::domain::ports::notifier::{NotificationError, Notifier};
use crate::domain::value_objects::alert_action::AlertAction;

/// Forwards notifications to multiple notifiers.
///
/// Always calls every notifier and returns the first error, so an alert only
/// counts as delivered when every channel accepted it.
pub struct CompositeNotifier {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl CompositeNotifier {
    #[must_use]
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify_alert(
        &self,
        alert: &CandidateAlert,
        actions: &[AlertAction],
    ) -> Result<(), NotificationError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify_alert(alert, actions).await {
                tracing::warn!("Notification failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn notify_action_result(&self, report: &ActionReport) -> Result<(), NotificationError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify_action_result(report).await {
                tracing::warn!("Action report failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
