//! Notification channel abstraction
//!
//! The fan-out engine and callback dispatcher talk to recipients through
//! [`NotifyChannel`] only. Production uses the Telegram transport; tests use
//! [`RecordingChannel`].

use async_trait::async_trait;
use shared::error::AppResult;
use std::collections::HashSet;
use std::sync::Mutex;

/// One inline keyboard button bound to a callback action token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub token: String,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Outbound messaging transport
///
/// `send_message` delivers text plus an optional inline keyboard to one chat.
/// `answer_callback` acknowledges an inbound button press so the sender's
/// client stops showing a pending indicator.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> AppResult<()>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> AppResult<()>;
}

/// A message captured by [`RecordingChannel`]
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub buttons: Vec<Vec<ActionButton>>,
}

/// A callback acknowledgment captured by [`RecordingChannel`]
#[derive(Debug, Clone)]
pub struct SentAck {
    pub callback_id: String,
    pub text: String,
}

/// In-process channel that records everything it is asked to send
///
/// Chats registered via [`RecordingChannel::fail_chat`] reject sends, which
/// lets tests exercise the fail-independent fan-out path.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentMessage>>,
    acks: Mutex<Vec<SentAck>>,
    fail_chats: Mutex<HashSet<i64>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// All subsequent sends to `chat_id` fail with a delivery error
    pub fn fail_chat(&self, chat_id: i64) {
        lock(&self.fail_chats).insert(chat_id);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn acks(&self) -> Vec<SentAck> {
        lock(&self.acks).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl NotifyChannel for RecordingChannel {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> AppResult<()> {
        if lock(&self.fail_chats).contains(&chat_id) {
            return Err(shared::error::AppError::delivery(format!(
                "send to chat {chat_id} failed"
            )));
        }
        lock(&self.sent).push(SentMessage {
            chat_id,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> AppResult<()> {
        lock(&self.acks).push(SentAck {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}
