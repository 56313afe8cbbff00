//! Inbound webhook payload types
//!
//! Minimal deserialization of the bot API update envelope: only the fields
//! the dispatcher consumes. Unknown fields are ignored.

use serde::Deserialize;

/// One webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    pub callback_query: Option<CallbackQuery>,
    pub message: Option<IncomingMessage>,
}

/// An inline keyboard button press
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: Sender,
    /// The action token the button was bound to
    pub data: Option<String>,
}

/// A plain chat message (logged, not acted on)
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
}
