use std::sync::Arc;

use async_trait::async_trait;

use super::html::{format_alert, format_report};
use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::report::ActionReport;
use crate::domain::ports::notifier::{NotificationError, Notifier};
use crate::domain::value_objects::alert_action::AlertAction;
use crate::infrastructure::telegram::TelegramClient;

/// Delivers alerts and action reports to the operator's private chat.
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
    chat_id: i64,
}

impl TelegramNotifier {
    #[must_use]
    pub const fn new(client: Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_alert(
        &self,
        alert: &CandidateAlert,
        actions: &[AlertAction],
    ) -> Result<(), NotificationError> {
        self.client
            .send_message(self.chat_id, &format_alert(alert), actions)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("{e:#}")))
    }

    async fn notify_action_result(&self, report: &ActionReport) -> Result<(), NotificationError> {
        self.client
            .send_message(self.chat_id, &format_report(report), &[])
            .await
            .map_err(|e| NotificationError::SendFailed(format!("{e:#}")))
    }
}
