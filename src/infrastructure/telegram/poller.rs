use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{CallbackQuery, Message, TelegramClient, Update};
use crate::domain::value_objects::alert_action::AlertAction;

const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Commands waiting for the worker; further ones are dropped with a warning.
const COMMAND_QUEUE: usize = 32;

/// Reply to a chat command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// HTML body.
    pub text: String,
    pub actions: Vec<AlertAction>,
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<AlertAction>) -> Self {
        self.actions = actions;
        self
    }
}

/// Bot behaviour behind the poller. Only the operator's updates reach it.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn on_command(&self, chat_id: i64, text: &str) -> Reply;

    /// Returns the toast shown for the pressed button.
    async fn on_callback(&self, data: &str, operator_id: i64) -> String;
}

/// The Bot API calls the poller needs.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_updates(&self, offset: Option<i64>) -> anyhow::Result<Vec<Update>>;

    async fn send_message(
        &self,
        chat_id: i64,
        html: &str,
        actions: &[AlertAction],
    ) -> anyhow::Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(&self, offset: Option<i64>) -> anyhow::Result<Vec<Update>> {
        Self::get_updates(self, offset).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        html: &str,
        actions: &[AlertAction],
    ) -> anyhow::Result<()> {
        Self::send_message(self, chat_id, html, actions).await
    }

    async fn answer_callback_query(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        Self::answer_callback_query(self, callback_id, text).await
    }
}

/// Long-polls `getUpdates` and routes the operator's messages and button presses.
///
/// Button presses are answered inline. Commands may shell out to `systemctl` or
/// `journalctl`, so they run in order on a separate worker task.
pub struct TelegramPoller {
    api: Arc<dyn BotApi>,
    admin_id: i64,
    handler: Arc<dyn UpdateHandler>,
}

impl TelegramPoller {
    #[must_use]
    pub fn new(api: Arc<dyn BotApi>, admin_id: i64, handler: Arc<dyn UpdateHandler>) -> Self {
        Self {
            api,
            admin_id,
            handler,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!("Telegram poller started");
        let (commands, queue) = mpsc::channel(COMMAND_QUEUE);
        let worker = tokio::spawn(run_commands(
            Arc::clone(&self.api),
            Arc::clone(&self.handler),
            queue,
            cancel.clone(),
        ));
        let mut offset: Option<i64> = None;

        loop {
            let updates = tokio::select! {
                () = cancel.cancelled() => break,
                result = self.api.get_updates(offset) => result,
            };

            match updates {
                Ok(updates) => {
                    if let Some(next) = next_offset(offset, &updates) {
                        offset = Some(next);
                    }
                    for update in updates {
                        self.route_update(update, &commands).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Telegram poll error: {e:#}");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        drop(commands);
        if let Err(e) = worker.await {
            tracing::error!("Command worker failed: {e}");
        }
        tracing::info!("Telegram poller stopped");
    }

    async fn route_update(&self, update: Update, commands: &mpsc::Sender<(i64, String)>) {
        if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await;
        } else if let Some(message) = update.message {
            self.queue_message(message, commands);
        }
    }

    fn queue_message(&self, message: Message, commands: &mpsc::Sender<(i64, String)>) {
        let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        let sender = message.from.as_ref().map(|u| u.id);
        if sender != Some(self.admin_id) {
            tracing::warn!(?sender, chat_id = message.chat.id, "Ignoring message from non-admin");
            return;
        }

        if let Err(e) = commands.try_send((message.chat.id, text.to_string())) {
            tracing::warn!("Dropping command, worker unavailable: {e}");
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) {
        let toast = if callback.from.id == self.admin_id {
            match callback.data.as_deref() {
                Some(data) => self.handler.on_callback(data, callback.from.id).await,
                None => String::new(),
            }
        } else {
            tracing::warn!(sender = callback.from.id, "Ignoring button press from non-admin");
            "\u{26d4} Not authorized".to_string()
        };

        if let Err(e) = self.api.answer_callback_query(&callback.id, &toast).await {
            tracing::warn!("Failed to answer callback: {e:#}");
        }
    }
}

/// Runs queued commands one at a time until the queue closes or `cancel` fires.
async fn run_commands(
    api: Arc<dyn BotApi>,
    handler: Arc<dyn UpdateHandler>,
    mut queue: mpsc::Receiver<(i64, String)>,
    cancel: CancellationToken,
) {
    loop {
        let (chat_id, text) = tokio::select! {
            () = cancel.cancelled() => break,
            next = queue.recv() => match next {
                Some(command) => command,
                None => break,
            },
        };

        let reply = tokio::select! {
            () = cancel.cancelled() => break,
            reply = handler.on_command(chat_id, &text) => reply,
        };
        if reply.text.is_empty() {
            continue;
        }
        if let Err(e) = api.send_message(chat_id, &reply.text, &reply.actions).await {
            tracing::warn!("Failed to send reply: {e:#}");
        }
    }
}

/// Offset acknowledging every update in the batch.
fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map(|next| current.map_or(next, |c| c.max(next)))
}
