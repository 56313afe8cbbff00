//! Telegram Bot API transport (no SDK dependency)

use super::channel::{ActionButton, NotifyChannel};
use async_trait::async_trait;
use serde_json::{Value, json};
use shared::error::{AppError, AppResult};

/// [`NotifyChannel`] over the Telegram Bot HTTP API
///
/// Messages are sent with MarkdownV2 parse mode; callers escape interpolated
/// text before it reaches this layer.
#[derive(Clone)]
pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramChannel {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }

    async fn call(&self, method: &str, payload: Value) -> AppResult<()> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .json(&payload)
            .send()
            .await
            .map_err(|err| AppError::delivery(format!("{method} request failed: {err}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::delivery(format!("{method} returned invalid JSON: {err}")))?;

        if body["ok"].as_bool() != Some(true) {
            let description = body["description"].as_str().unwrap_or("unknown error");
            return Err(AppError::delivery(format!("{method} rejected: {description}")));
        }
        Ok(())
    }
}

#[async_trait]
impl NotifyChannel for TelegramChannel {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> AppResult<()> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "MarkdownV2",
        });
        if !buttons.is_empty() {
            let keyboard: Vec<Vec<Value>> = buttons
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({"text": b.label, "callback_data": b.token}))
                        .collect()
                })
                .collect();
            payload["reply_markup"] = json!({"inline_keyboard": keyboard});
        }
        self.call("sendMessage", payload).await
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> AppResult<()> {
        self.call(
            "answerCallbackQuery",
            json!({"callback_query_id": callback_id, "text": text}),
        )
        .await
    }
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("api_base", &"<redacted>")
            .finish()
    }
}
