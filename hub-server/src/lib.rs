//! Foodhub Hub Server - order intake and status broadcast for a
//! multi-store delivery storefront
//!
//! # Architecture overview
//!
//! The hub sits between the public storefront and the Telegram chats of the
//! people who fulfil orders:
//!
//! - **HTTP API** (`api`): order intake, listing, and status polling
//! - **Orders** (`orders`): submission normalization, pricing, the status
//!   state machine, and the redb-backed repository
//! - **Notify** (`notify`): message formatting and chat fan-out
//! - **Callback** (`callback`): inbound bot updates and button dispatch
//!
//! # Module structure
//!
//! ```text
//! hub-server/src/
//! ├── core/          # configuration, state, server assembly
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # order builder, transitions, storage
//! ├── notify/        # formatting, routing, Telegram channel
//! ├── callback/      # webhook updates, token parsing, dispatcher
//! └── utils/         # logging
//! ```

pub mod api;
pub mod callback;
pub mod core;
pub mod notify;
pub mod orders;
pub mod utils;

// Re-export public types
pub use callback::Dispatcher;
pub use core::{Config, Server, ServerState};
pub use notify::{Notifier, NotifyChannel, TelegramChannel};
pub use orders::OrderStorage;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging
///
/// `LOG_LEVEL` and `LOG_DIR` are read here, before [`Config`], so that
/// configuration errors are already logged through the subscriber.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").ok();
    let dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(level.as_deref(), dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ______                ____          __
   / ____/___  ____  ____/ / /_  __  __/ /_
  / /_  / __ \/ __ \/ __  / __ \/ / / / __ \
 / /   / /_/ / /_/ / /_/ / / / / /_/ / /_/ /
/_/    \____/\____/\__,_/_/ /_/\__,_/_.___/
    "#
    );
}
