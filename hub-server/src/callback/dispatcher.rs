//! Inbound callback dispatcher
//!
//! Takes webhook updates, parses the action token, validates the requested
//! change against the state machine, applies it through the repository, and
//! re-broadcasts. Every button press is acknowledged exactly once; malformed
//! or rejected requests get a rejection text and mutate nothing.

use super::token::{CallbackAction, parse_token};
use super::update::{CallbackQuery, Update};
use crate::notify::Notifier;
use crate::orders::storage::OrderStorage;
use crate::orders::transitions::{apply_cancel, apply_transition};
use shared::order::{Order, OrderStatus};
use tracing::{debug, info, warn};

/// What to re-broadcast after a successful mutation
enum Broadcast {
    None,
    PaymentConfirmed(Order),
    StatusChanged(Order),
}

#[derive(Clone)]
pub struct Dispatcher {
    storage: OrderStorage,
    notifier: Notifier,
}

impl Dispatcher {
    pub fn new(storage: OrderStorage, notifier: Notifier) -> Self {
        Self { storage, notifier }
    }

    /// Process one webhook update
    ///
    /// Plain chat messages are logged and dropped; only button presses
    /// carry actions.
    pub async fn dispatch(&self, update: Update) {
        if let Some(query) = &update.callback_query {
            self.handle_callback(query).await;
        } else if let Some(message) = &update.message {
            debug!(
                chat_id = message.chat.id,
                text = message.text.as_deref().unwrap_or(""),
                "[Dispatch] Ignoring plain message"
            );
        }
    }

    async fn handle_callback(&self, query: &CallbackQuery) {
        let data = query.data.as_deref().unwrap_or("");
        let Some(action) = parse_token(data) else {
            debug!(
                sender_id = query.from.id,
                data, "[Dispatch] Malformed callback token"
            );
            self.acknowledge(&query.id, "Unsupported action").await;
            return;
        };

        info!(
            sender_id = query.from.id,
            sender = query.from.username.as_deref().unwrap_or(""),
            order_id = action.order_id(),
            "[Dispatch] Callback action received"
        );

        let (ack_text, broadcast) = self.apply(&action);
        // Ack first so the sender's client stops spinning before the
        // broadcast round-trips
        self.acknowledge(&query.id, &ack_text).await;

        match broadcast {
            Broadcast::PaymentConfirmed(order) => self.notifier.payment_confirmed(&order).await,
            Broadcast::StatusChanged(order) => self.notifier.status_changed(&order).await,
            Broadcast::None => {}
        }
    }

    fn apply(&self, action: &CallbackAction) -> (String, Broadcast) {
        let actor = action.actor();
        match action {
            CallbackAction::ConfirmPayment { order_id } => {
                let result = self.storage.update(order_id, |order| {
                    apply_transition(order, OrderStatus::PaymentConfirmed, &actor).map(|_| ())
                });
                match result {
                    Ok(order) => (
                        "Payment confirmed".to_string(),
                        Broadcast::PaymentConfirmed(order),
                    ),
                    Err(err) => (err.message.clone(), Broadcast::None),
                }
            }
            CallbackAction::SetStatus {
                order_id, status, ..
            } => {
                let mut changed = true;
                let result = self.storage.update(order_id, |order| {
                    changed = apply_transition(order, *status, &actor)?;
                    Ok(())
                });
                match result {
                    Ok(order) if changed => (
                        format!("Status updated: {}", order.status.as_str()),
                        Broadcast::StatusChanged(order),
                    ),
                    // Self-transition: acknowledged, history appended, no
                    // re-broadcast
                    Ok(order) => (
                        format!("Already {}", order.status.as_str()),
                        Broadcast::None,
                    ),
                    Err(err) => (err.message.clone(), Broadcast::None),
                }
            }
            CallbackAction::Cancel { order_id } => {
                let result = self
                    .storage
                    .update(order_id, |order| apply_cancel(order, &actor));
                match result {
                    Ok(order) => ("Order cancelled".to_string(), Broadcast::StatusChanged(order)),
                    Err(err) => (err.message.clone(), Broadcast::None),
                }
            }
        }
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) {
        if let Err(err) = self.notifier.channel().answer_callback(callback_id, text).await {
            warn!(callback_id, error = %err, "[Dispatch] Failed to acknowledge callback");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::update::{Chat, IncomingMessage, Sender};
    use crate::notify::{RecordingChannel, Routing};
    use rust_decimal::dec;
    use shared::order::{Customer, HistoryEntry, LineItem, PaymentMethod, Totals};
    use std::collections::HashMap;
    use std::sync::Arc;

    const ADMIN: i64 = 1;
    const COURIER: i64 = 2;
    const PIZZERIA: i64 = 10;

    fn make_order(id: &str, payment: PaymentMethod) -> Order {
        Order {
            id: id.to_string(),
            customer: Customer {
                name: "Ani".to_string(),
                phone: "+374".to_string(),
                address: "1 Main St".to_string(),
                district: "Kentron".to_string(),
                comment: None,
            },
            payment,
            items: vec![LineItem::new("Pizza", "pizzeria", 1, dec!(1000))],
            store_keys: vec!["pizzeria".to_string()],
            totals: Totals {
                items_total: dec!(1000),
                delivery_fee: dec!(0),
                grand_total: dec!(1000),
            },
            status: OrderStatus::New,
            history: vec![HistoryEntry {
                at: 0,
                status: OrderStatus::New,
                actor: "system".to_string(),
            }],
            created_at: 0,
            updated_at: 0,
        }
    }

    fn setup() -> (OrderStorage, Arc<RecordingChannel>, Dispatcher) {
        let storage = OrderStorage::open_in_memory().unwrap();
        let channel = Arc::new(RecordingChannel::new());
        let mut store_chats = HashMap::new();
        store_chats.insert("pizzeria".to_string(), PIZZERIA);
        let notifier = Notifier::new(
            channel.clone(),
            Routing {
                admin_chat: ADMIN,
                courier_chat: COURIER,
                store_chats,
            },
        );
        let dispatcher = Dispatcher::new(storage.clone(), notifier);
        (storage, channel, dispatcher)
    }

    fn press(data: &str) -> Update {
        Update {
            update_id: 1,
            callback_query: Some(CallbackQuery {
                id: "cb1".to_string(),
                from: Sender {
                    id: 7,
                    username: Some("ani".to_string()),
                },
                data: Some(data.to_string()),
            }),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_set_status_applies_and_broadcasts() {
        let (storage, channel, dispatcher) = setup();
        let mut order = make_order("900", PaymentMethod::Cash);
        order.status = OrderStatus::Preparing;
        storage.create(&order).unwrap();

        dispatcher.dispatch(press("o:900:set_status:assembled")).await;

        assert_eq!(
            storage.get("900").unwrap().unwrap().status,
            OrderStatus::Assembled
        );
        let acks = channel.acks();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].text, "Status updated: ASSEMBLED");
        // Admin, store, courier all notified
        let chats: Vec<i64> = channel.sent().iter().map(|m| m.chat_id).collect();
        assert_eq!(chats, vec![ADMIN, PIZZERIA, COURIER]);
    }

    #[tokio::test]
    async fn test_unknown_order_acknowledged_without_broadcast() {
        let (_storage, channel, dispatcher) = setup();

        dispatcher.dispatch(press("o:404:set_status:preparing")).await;

        assert_eq!(channel.acks().len(), 1);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_token_neutral_ack() {
        let (_storage, channel, dispatcher) = setup();

        dispatcher.dispatch(press("garbage")).await;

        let acks = channel.acks();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].text, "Unsupported action");
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_payment_releases_fanout() {
        let (storage, channel, dispatcher) = setup();
        storage
            .create(&make_order("901", PaymentMethod::Transfer))
            .unwrap();

        dispatcher.dispatch(press("o:901:confirm_payment")).await;

        let order = storage.get("901").unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::PaymentConfirmed);
        assert_eq!(order.history.last().unwrap().actor, "admin");
        assert_eq!(channel.acks()[0].text, "Payment confirmed");
        let chats: Vec<i64> = channel.sent().iter().map(|m| m.chat_id).collect();
        assert_eq!(chats, vec![ADMIN, PIZZERIA, COURIER]);
    }

    #[tokio::test]
    async fn test_confirm_payment_rejected_for_cash() {
        let (storage, channel, dispatcher) = setup();
        storage.create(&make_order("902", PaymentMethod::Cash)).unwrap();

        dispatcher.dispatch(press("o:902:confirm_payment")).await;

        assert_eq!(
            storage.get("902").unwrap().unwrap().status,
            OrderStatus::New
        );
        assert_eq!(channel.acks().len(), 1);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_self_transition_acks_without_broadcast() {
        let (storage, channel, dispatcher) = setup();
        let mut order = make_order("903", PaymentMethod::Cash);
        order.status = OrderStatus::Preparing;
        storage.create(&order).unwrap();

        dispatcher.dispatch(press("o:903:set_status:preparing")).await;

        let stored = storage.get("903").unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Preparing);
        assert_eq!(stored.history.len(), 2);
        assert_eq!(channel.acks()[0].text, "Already PREPARING");
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_store_button_records_store_actor() {
        let (storage, channel, dispatcher) = setup();
        let mut order = make_order("904", PaymentMethod::Cash);
        order.status = OrderStatus::Preparing;
        storage.create(&order).unwrap();

        dispatcher
            .dispatch(press("o:904:set_status:assembled:pizzeria"))
            .await;

        let stored = storage.get("904").unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Assembled);
        assert_eq!(stored.history.last().unwrap().actor, "store:pizzeria");
        assert_eq!(channel.acks().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_broadcasts_terminal_state() {
        let (storage, channel, dispatcher) = setup();
        storage.create(&make_order("905", PaymentMethod::Cash)).unwrap();

        dispatcher.dispatch(press("o:905:cancel")).await;

        assert_eq!(
            storage.get("905").unwrap().unwrap().status,
            OrderStatus::Cancelled
        );
        assert_eq!(channel.acks()[0].text, "Order cancelled");
        let sent = channel.sent();
        assert_eq!(sent.len(), 3);
        // Terminal status renders no admin action buttons
        assert!(sent[0].buttons.is_empty());
    }

    #[tokio::test]
    async fn test_plain_message_ignored() {
        let (_storage, channel, dispatcher) = setup();

        dispatcher
            .dispatch(Update {
                update_id: 2,
                callback_query: None,
                message: Some(IncomingMessage {
                    chat: Chat { id: 5 },
                    text: Some("/start".to_string()),
                }),
            })
            .await;

        assert!(channel.acks().is_empty());
        assert!(channel.sent().is_empty());
    }
}
