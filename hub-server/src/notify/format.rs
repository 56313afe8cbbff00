//! Per-recipient message rendering
//!
//! Pure functions from an order to MarkdownV2 text plus inline keyboards.
//! The admin sees the full order, each store sees only its own line items,
//! the courier sees a pickup summary without per-line detail. Every
//! interpolated user-supplied string goes through [`escape_markdown`] first.

use super::channel::ActionButton;
use crate::orders::transitions::next_status;
use rust_decimal::Decimal;
use shared::order::{Order, OrderStatus, PaymentMethod};

/// Escape the MarkdownV2 reserved character set
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '_' | '*'
                | '['
                | ']'
                | '('
                | ')'
                | '~'
                | '`'
                | '>'
                | '#'
                | '+'
                | '-'
                | '='
                | '|'
                | '{'
                | '}'
                | '.'
                | '!'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Decimal amounts can carry a fractional dot, which MarkdownV2 reserves
fn money(amount: Decimal) -> String {
    escape_markdown(&amount.to_string())
}

fn human_status(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::New => "New",
        OrderStatus::PaymentConfirmed => "Payment confirmed",
        OrderStatus::Preparing => "Preparing",
        OrderStatus::Assembled => "Assembled",
        OrderStatus::Picked => "Picked up",
        OrderStatus::OnTheWay => "On the way",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}

fn customer_block(order: &Order) -> String {
    let mut text = format!(
        "Customer: {}, {}\nAddress: {}, {}",
        escape_markdown(&order.customer.name),
        escape_markdown(&order.customer.phone),
        escape_markdown(&order.customer.address),
        escape_markdown(&order.customer.district),
    );
    if let Some(comment) = &order.customer.comment {
        text.push_str("\nComment: ");
        text.push_str(&escape_markdown(comment));
    }
    text
}

fn item_line(name: &str, quantity: u32, line_total: Decimal) -> String {
    format!("• {} x{}: {}", escape_markdown(name), quantity, money(line_total))
}

// ============================================================================
// Admin
// ============================================================================

/// Full order detail for the admin chat
pub fn admin_order_created(order: &Order) -> String {
    let mut text = format!("*New order {}*\n{}\n", order.id, customer_block(order));
    for item in &order.items {
        text.push('\n');
        text.push_str(&item_line(&item.name, item.quantity, item.line_total));
    }
    text.push_str(&format!(
        "\n\nItems: {}\nDelivery: {}\n*Total: {}*\nPayment: {}",
        money(order.totals.items_total),
        money(order.totals.delivery_fee),
        money(order.totals.grand_total),
        order.payment.as_str(),
    ));
    text
}

/// Admin prompt for an unpaid transfer order; store and courier messages
/// stay withheld until the confirmation fires
pub fn admin_payment_pending(order: &Order) -> String {
    format!(
        "{}\n\nTransfer payment pending\\. Confirm to release the order to stores and courier\\.",
        admin_order_created(order)
    )
}

pub fn admin_status_changed(order: &Order) -> String {
    format!(
        "*Order {}*\nStatus: {}",
        order.id,
        escape_markdown(human_status(order.status))
    )
}

/// One warning per unmapped store key, sent to the admin chat
pub fn admin_unmapped_store(store_key: &str, order_id: &str) -> String {
    format!(
        "Warning: store {} has no chat configured, order {} was not delivered to it",
        escape_markdown(store_key),
        order_id
    )
}

/// Action keyboard matching the order's current status
///
/// Transfer orders in `New` get the confirm-payment button; otherwise the
/// next step of the flow. Cancel stays available until a terminal status.
pub fn admin_keyboard(order: &Order) -> Vec<Vec<ActionButton>> {
    if order.status.is_terminal() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    if order.payment == PaymentMethod::Transfer && order.status == OrderStatus::New {
        rows.push(vec![ActionButton::new(
            "Confirm payment",
            format!("o:{}:confirm_payment", order.id),
        )]);
    } else if let Some(next) = next_status(order.payment, order.status) {
        rows.push(vec![ActionButton::new(
            human_status(next),
            format!("o:{}:set_status:{}", order.id, next.token()),
        )]);
    }
    rows.push(vec![ActionButton::new(
        "Cancel order",
        format!("o:{}:cancel", order.id),
    )]);
    rows
}

// ============================================================================
// Store
// ============================================================================

/// Store view: only that store's line items, no money totals
pub fn store_order_created(order: &Order, store_key: &str) -> String {
    let mut text = format!("*New order {}*\n{}\n", order.id, customer_block(order));
    for item in order.items.iter().filter(|i| i.store_key == store_key) {
        text.push('\n');
        text.push_str(&format!(
            "• {} x{}",
            escape_markdown(&item.name),
            item.quantity
        ));
    }
    text
}

pub fn store_status_changed(order: &Order) -> String {
    admin_status_changed(order)
}

/// Stores report exactly one thing: their part is assembled
pub fn store_keyboard(order_id: &str, store_key: &str) -> Vec<Vec<ActionButton>> {
    vec![vec![ActionButton::new(
        "Assembled",
        format!("o:{order_id}:set_status:assembled:{store_key}"),
    )]]
}

// ============================================================================
// Courier
// ============================================================================

/// Courier summary: pickup and drop-off info without per-line detail
pub fn courier_order_created(order: &Order) -> String {
    format!(
        "*Order {}*\nStores: {}\nAddress: {}, {}\nPhone: {}\nTotal: {}\nPayment: {}",
        order.id,
        escape_markdown(&order.store_keys.join(", ")),
        escape_markdown(&order.customer.address),
        escape_markdown(&order.customer.district),
        escape_markdown(&order.customer.phone),
        money(order.totals.grand_total),
        order.payment.as_str(),
    )
}

pub fn courier_status_changed(order: &Order) -> String {
    admin_status_changed(order)
}

pub fn courier_keyboard(order_id: &str) -> Vec<Vec<ActionButton>> {
    vec![vec![
        ActionButton::new("Picked up", format!("o:{order_id}:set_status:picked")),
        ActionButton::new("On the way", format!("o:{order_id}:set_status:on_the_way")),
        ActionButton::new("Delivered", format!("o:{order_id}:set_status:delivered")),
    ]]
}
