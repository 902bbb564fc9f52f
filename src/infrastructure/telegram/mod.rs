pub mod poller;

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::alert_action::AlertAction;

const API_BASE: &str = "https://api.telegram.org";

/// Extra HTTP time on top of the long-poll timeout.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

/// Minimal Bot API client: messages with inline keyboards, long polling and callback answers.
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built.
    pub fn new(token: &str, poll_timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(token, poll_timeout_secs, API_BASE)
    }

    /// Client against a custom API root, for local Bot API servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built.
    pub fn with_base_url(token: &str, poll_timeout_secs: u64, api_base: &str) -> Result<Self> {
        if token.trim().is_empty() {
            bail!("telegram token cannot be empty");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs) + HTTP_TIMEOUT_SLACK)
            .build()
            .context("failed to build telegram HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token.trim()),
            poll_timeout_secs,
        })
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .with_context(|| format!("telegram {method} failed"))?;

        let status = response.status();
        let payload = response
            .json::<ApiResponse<R>>()
            .await
            .with_context(|| format!("invalid telegram {method} payload ({status})"))?;

        if !payload.ok {
            let description = payload.description.unwrap_or_else(|| "<none>".into());
            return Err(anyhow!("telegram {method} error ({status}): {description}"));
        }
        payload
            .result
            .ok_or_else(|| anyhow!("telegram {method} returned no result"))
    }

    /// Send an HTML message, optionally with one row of action buttons.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects the message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        html: &str,
        actions: &[AlertAction],
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text: html,
            parse_mode: "HTML",
            disable_web_page_preview: true,
            reply_markup: (!actions.is_empty()).then(|| keyboard(actions)),
        };
        let _: Message = self.call("sendMessage", &request).await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    /// Show a toast for a pressed button.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn answer_callback_query(&self, callback_id: &str, text: &str) -> Result<()> {
        let request = AnswerCallbackRequest {
            callback_query_id: callback_id,
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }
}

/// One row of buttons whose `callback_data` are encoded action tokens.
#[must_use]
pub fn keyboard(actions: &[AlertAction]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![actions
            .iter()
            .map(|action| InlineKeyboardButton {
                text: action.label().to_string(),
                callback_data: action.token(),
            })
            .collect()],
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}
