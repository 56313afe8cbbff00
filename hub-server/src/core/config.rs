//! Server configuration
//!
//! All settings come from environment variables:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/foodhub/hub | storage and log directory |
//! | HTTP_PORT | 8080 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | API_KEY | (required) | shared secret for the inbound API |
//! | BOT_TOKEN | (required) | Telegram bot credential |
//! | ADMIN_CHAT_ID | (required) | admin chat |
//! | COURIER_CHAT_ID | falls back to ADMIN_CHAT_ID | courier chat |
//! | STORE_CHATS | {} | JSON `{storeKey: chatId}` |
//! | DISTRICT_FEES | {} | JSON `{district: fee}` |
//! | CATALOG | {} | JSON `{storeKey: {productName: price}}` |
//!
//! `LOG_LEVEL` and `LOG_DIR` are consumed earlier, by
//! [`setup_environment`](crate::setup_environment).
//!
//! Missing required variables fail startup with a configuration error;
//! an unmapped store key only surfaces later as an admin warning during
//! fan-out.

use crate::notify::Routing;
use crate::orders::builder::{Catalog, DistrictFees};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Config {
    /// Storage and log directory
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Shared secret checked against the x-api-key header
    pub api_key: String,
    pub bot_token: String,
    pub admin_chat_id: i64,
    pub courier_chat_id: i64,
    /// store key -> chat id
    pub store_chats: HashMap<String, i64>,
    /// district name -> delivery fee
    pub district_fees: DistrictFees,
    /// store key -> product name -> unit price
    pub catalog: Catalog,
}

impl Config {
    /// Load from the environment, failing fast on missing required values
    pub fn from_env() -> AppResult<Self> {
        let admin_chat_id = parse_chat_id("ADMIN_CHAT_ID", &required("ADMIN_CHAT_ID")?)?;
        let courier_chat_id = match std::env::var("COURIER_CHAT_ID") {
            Ok(raw) => parse_chat_id("COURIER_CHAT_ID", &raw)?,
            Err(_) => admin_chat_id,
        };

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/foodhub/hub".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            api_key: required("API_KEY")?,
            bot_token: required("BOT_TOKEN")?,
            admin_chat_id,
            courier_chat_id,
            store_chats: parse_store_chats(&optional_json("STORE_CHATS"))?,
            district_fees: parse_district_fees(&optional_json("DISTRICT_FEES"))?,
            catalog: parse_catalog(&optional_json("CATALOG"))?,
        })
    }

    /// Chat routing table for the fan-out engine
    pub fn routing(&self) -> Routing {
        Routing {
            admin_chat: self.admin_chat_id,
            courier_chat: self.courier_chat_id,
            store_chats: self.store_chats.clone(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn required(name: &str) -> AppResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::configuration(format!(
            "missing required environment variable {name}"
        ))),
    }
}

fn optional_json(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| "{}".into())
}

fn parse_chat_id(name: &str, raw: &str) -> AppResult<i64> {
    raw.trim().parse().map_err(|_| {
        AppError::configuration(format!("{name} must be a numeric chat id, got {raw:?}"))
    })
}

/// Parse the `{storeKey: chatId}` routing blob
pub fn parse_store_chats(raw: &str) -> AppResult<HashMap<String, i64>> {
    serde_json::from_str(raw)
        .map_err(|err| AppError::configuration(format!("STORE_CHATS is not valid JSON: {err}")))
}

/// Parse the `{district: fee}` blob
pub fn parse_district_fees(raw: &str) -> AppResult<DistrictFees> {
    serde_json::from_str::<HashMap<String, Decimal>>(raw)
        .map_err(|err| AppError::configuration(format!("DISTRICT_FEES is not valid JSON: {err}")))
}

/// Parse the `{storeKey: {productName: price}}` blob
pub fn parse_catalog(raw: &str) -> AppResult<Catalog> {
    serde_json::from_str::<Catalog>(raw)
        .map_err(|err| AppError::configuration(format!("CATALOG is not valid JSON: {err}")))
}
