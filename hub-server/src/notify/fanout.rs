//! Multi-recipient notification fan-out
//!
//! One event, several differently-rendered messages: admin chat, every
//! implicated store chat, courier chat. Sends run sequentially and are
//! fail-independent. A store key with no mapped chat is skipped and the
//! admin chat receives one warning naming the key and the order id.

use super::channel::{ActionButton, NotifyChannel};
use super::format;
use shared::order::{Order, PaymentMethod};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Chat routing table from configuration
#[derive(Debug, Clone)]
pub struct Routing {
    pub admin_chat: i64,
    pub courier_chat: i64,
    pub store_chats: HashMap<String, i64>,
}

/// Fan-out engine over a [`NotifyChannel`]
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotifyChannel>,
    routing: Routing,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotifyChannel>, routing: Routing) -> Self {
        Self { channel, routing }
    }

    pub fn channel(&self) -> &Arc<dyn NotifyChannel> {
        &self.channel
    }

    /// Initial broadcast after an order is persisted
    ///
    /// Transfer orders notify only the admin with a confirm-payment prompt;
    /// store and courier messages are withheld until the confirmation
    /// transition fires.
    pub async fn order_created(&self, order: &Order) {
        if order.payment == PaymentMethod::Transfer {
            self.deliver(
                self.routing.admin_chat,
                &format::admin_payment_pending(order),
                &format::admin_keyboard(order),
                "admin",
                &order.id,
            )
            .await;
            debug!(order_id = %order.id, "[Notify] Store/courier fan-out withheld until payment confirmation");
            return;
        }

        self.deliver(
            self.routing.admin_chat,
            &format::admin_order_created(order),
            &format::admin_keyboard(order),
            "admin",
            &order.id,
        )
        .await;
        self.fulfillment_fanout(order).await;
    }

    /// Release the store/courier messages withheld at creation
    pub async fn payment_confirmed(&self, order: &Order) {
        self.deliver(
            self.routing.admin_chat,
            &format::admin_status_changed(order),
            &format::admin_keyboard(order),
            "admin",
            &order.id,
        )
        .await;
        self.fulfillment_fanout(order).await;
    }

    /// Broadcast a status change to admin, implicated stores, and courier
    pub async fn status_changed(&self, order: &Order) {
        self.deliver(
            self.routing.admin_chat,
            &format::admin_status_changed(order),
            &format::admin_keyboard(order),
            "admin",
            &order.id,
        )
        .await;

        for store_key in &order.store_keys {
            match self.routing.store_chats.get(store_key) {
                Some(&chat) => {
                    self.deliver(
                        chat,
                        &format::store_status_changed(order),
                        &format::store_keyboard(&order.id, store_key),
                        "store",
                        &order.id,
                    )
                    .await;
                }
                None => self.warn_unmapped(store_key, &order.id).await,
            }
        }

        self.deliver(
            self.routing.courier_chat,
            &format::courier_status_changed(order),
            &format::courier_keyboard(&order.id),
            "courier",
            &order.id,
        )
        .await;
    }

    /// Store and courier messages for a newly actionable order
    async fn fulfillment_fanout(&self, order: &Order) {
        for store_key in &order.store_keys {
            match self.routing.store_chats.get(store_key) {
                Some(&chat) => {
                    self.deliver(
                        chat,
                        &format::store_order_created(order, store_key),
                        &format::store_keyboard(&order.id, store_key),
                        "store",
                        &order.id,
                    )
                    .await;
                }
                None => self.warn_unmapped(store_key, &order.id).await,
            }
        }

        self.deliver(
            self.routing.courier_chat,
            &format::courier_order_created(order),
            &format::courier_keyboard(&order.id),
            "courier",
            &order.id,
        )
        .await;
    }

    async fn warn_unmapped(&self, store_key: &str, order_id: &str) {
        warn!(store_key, order_id, "[Notify] Store key has no mapped chat, skipping");
        self.deliver(
            self.routing.admin_chat,
            &format::admin_unmapped_store(store_key, order_id),
            &[],
            "admin",
            order_id,
        )
        .await;
    }

    /// Single send; a failure is logged and never aborts sibling sends
    async fn deliver(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
        recipient: &str,
        order_id: &str,
    ) {
        if let Err(err) = self.channel.send_message(chat_id, text, buttons).await {
            warn!(chat_id, recipient, order_id, error = %err, "[Notify] Delivery failed");
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("routing", &self.routing)
            .finish()
    }
}
