//! Inbound bot webhook
//!
//! Always answers 200 immediately; the dispatcher runs on a detached task.
//! A body that does not parse as an update is logged and dropped, never
//! surfaced as an HTTP error, so the bot platform does not retry-storm.

use crate::callback::Update;
use crate::core::ServerState;
use axum::extract::State;
use shared::error::ApiResponse;
use tracing::debug;

/// POST /tg-webhook
pub async fn webhook(State(state): State<ServerState>, body: String) -> ApiResponse<()> {
    match serde_json::from_str::<Update>(&body) {
        Ok(update) => {
            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.dispatch(update).await;
            });
        }
        Err(err) => {
            debug!(error = %err, "[Webhook] Unparseable update body");
        }
    }
    ApiResponse::ok()
}
