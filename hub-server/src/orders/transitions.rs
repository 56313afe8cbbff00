//! Status state machine
//!
//! Each payment method has one linear flow. A requested transition is legal
//! only when both statuses belong to the order's flow and the target is the
//! current step or the step directly after it. Cancellation is a separate
//! administrative action that bypasses the step rule.

use shared::error::{AppError, AppResult};
use shared::order::{HistoryEntry, Order, OrderStatus, PaymentMethod};
use shared::util::now_millis;

/// Cash orders go straight into preparation
const CASH_FLOW: &[OrderStatus] = &[
    OrderStatus::New,
    OrderStatus::Preparing,
    OrderStatus::Assembled,
    OrderStatus::Picked,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
];

/// Transfer orders wait for a manual payment confirmation first
const TRANSFER_FLOW: &[OrderStatus] = &[
    OrderStatus::New,
    OrderStatus::PaymentConfirmed,
    OrderStatus::Preparing,
    OrderStatus::Assembled,
    OrderStatus::Picked,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
];

/// The linear flow for a payment method
pub fn flow_for(payment: PaymentMethod) -> &'static [OrderStatus] {
    match payment {
        PaymentMethod::Cash => CASH_FLOW,
        PaymentMethod::Transfer => TRANSFER_FLOW,
    }
}

/// The next step after `current`, if any
pub fn next_status(payment: PaymentMethod, current: OrderStatus) -> Option<OrderStatus> {
    let flow = flow_for(payment);
    let idx = flow.iter().position(|s| *s == current)?;
    flow.get(idx + 1).copied()
}

/// Check whether `current -> requested` is legal for the payment method
///
/// Legal means both statuses are in the flow and the requested index is the
/// current index or the one after it. Re-requesting the current status is
/// accepted as a no-op acknowledgment.
pub fn check_transition(
    payment: PaymentMethod,
    current: OrderStatus,
    requested: OrderStatus,
) -> AppResult<()> {
    if current.is_terminal() {
        return Err(AppError::already_final(current.as_str()));
    }

    let flow = flow_for(payment);
    let current_idx = flow.iter().position(|s| *s == current);
    let requested_idx = flow.iter().position(|s| *s == requested);

    match (current_idx, requested_idx) {
        (Some(c), Some(r)) if r == c || r == c + 1 => Ok(()),
        _ => Err(AppError::illegal_transition(
            current.as_str(),
            requested.as_str(),
        )),
    }
}

/// Apply a requested transition, appending a history entry
///
/// Returns `true` when the status actually changed, `false` for the
/// self-transition no-op (which still appends history). Illegal requests
/// leave the order untouched.
pub fn apply_transition(
    order: &mut Order,
    requested: OrderStatus,
    actor: &str,
) -> AppResult<bool> {
    check_transition(order.payment, order.status, requested)?;

    let changed = order.status != requested;
    let now = now_millis();
    order.status = requested;
    order.updated_at = now;
    order.history.push(HistoryEntry {
        at: now,
        status: requested,
        actor: actor.to_string(),
    });
    Ok(changed)
}

/// Administrative cancel, allowed from any non-terminal status
pub fn apply_cancel(order: &mut Order, actor: &str) -> AppResult<()> {
    if order.status.is_terminal() {
        return Err(AppError::already_final(order.status.as_str()));
    }

    let now = now_millis();
    order.status = OrderStatus::Cancelled;
    order.updated_at = now;
    order.history.push(HistoryEntry {
        at: now,
        status: OrderStatus::Cancelled,
        actor: actor.to_string(),
    });
    Ok(())
}
