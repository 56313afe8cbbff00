//! Outbound notifications
//!
//! - `channel`: transport trait plus the recording test double
//! - `telegram`: Telegram Bot API transport
//! - `format`: per-recipient text and keyboard rendering
//! - `fanout`: the multi-recipient broadcast engine

pub mod channel;
pub mod fanout;
pub mod format;
pub mod telegram;

pub use channel::{ActionButton, NotifyChannel, RecordingChannel};
pub use fanout::{Notifier, Routing};
pub use telegram::TelegramChannel;
