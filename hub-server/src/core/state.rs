//! Shared server state
//!
//! One `Clone`-cheap struct threaded through every handler: configuration,
//! the order repository, the fan-out engine, and the callback dispatcher.

use crate::callback::Dispatcher;
use crate::core::Config;
use crate::notify::{Notifier, NotifyChannel, TelegramChannel};
use crate::orders::storage::OrderStorage;
use shared::error::{AppError, AppResult};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: OrderStorage,
    pub notifier: Notifier,
    pub dispatcher: Dispatcher,
    started_at: Instant,
}

impl ServerState {
    /// Open storage under the work dir and wire the Telegram channel
    pub fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|err| {
            AppError::configuration(format!(
                "cannot create work dir {}: {err}",
                config.work_dir
            ))
        })?;

        let db_path = std::path::Path::new(&config.work_dir).join("orders.redb");
        let storage = OrderStorage::open(db_path)?;
        let channel: Arc<dyn NotifyChannel> = Arc::new(TelegramChannel::new(&config.bot_token));

        Ok(Self::with_channel(config.clone(), storage, channel))
    }

    /// Assemble state over an explicit channel and storage (used by tests)
    pub fn with_channel(
        config: Config,
        storage: OrderStorage,
        channel: Arc<dyn NotifyChannel>,
    ) -> Self {
        let notifier = Notifier::new(channel, config.routing());
        let dispatcher = Dispatcher::new(storage.clone(), notifier.clone());
        Self {
            config,
            storage,
            notifier,
            dispatcher,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("environment", &self.config.environment)
            .field("http_port", &self.config.http_port)
            .finish()
    }
}
