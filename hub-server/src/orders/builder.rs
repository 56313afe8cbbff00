//! Order builder
//!
//! This module normalizes raw storefront submissions into canonical
//! [`Order`] records:
//! - `build_order`: validate a submission and produce the order
//!
//! Both submission shapes are accepted. The explicit `items` array wins when
//! present and non-empty; otherwise line items are derived from the legacy
//! `carts` map with unit prices resolved from the configured catalog.
//! Order creation never blocks on an unknown price, it resolves to zero.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use shared::order::{Customer, HistoryEntry, LineItem, Order, OrderStatus, OrderSubmission, Totals};
use shared::util::{now_millis, snowflake_id};
use std::collections::HashMap;
use tracing::debug;

/// Per-store product price table from configuration
pub type Catalog = HashMap<String, HashMap<String, Decimal>>;

/// District name to delivery fee table from configuration
pub type DistrictFees = HashMap<String, Decimal>;

/// Validate a submission and build the canonical order record
pub fn build_order(
    submission: &OrderSubmission,
    catalog: &Catalog,
    district_fees: &DistrictFees,
) -> AppResult<Order> {
    validate_contact(submission)?;

    let items = collect_items(submission, catalog)?;

    let mut store_keys: Vec<String> = Vec::new();
    for item in &items {
        if !store_keys.contains(&item.store_key) {
            store_keys.push(item.store_key.clone());
        }
    }
    if store_keys.is_empty() {
        return Err(AppError::order_empty());
    }

    let items_total: Decimal = items.iter().map(|i| i.line_total).sum();
    // Exact district name lookup; unknown districts ship for free
    let delivery_fee = district_fees
        .get(&submission.district)
        .copied()
        .unwrap_or(Decimal::ZERO);
    let grand_total = items_total + delivery_fee;

    let now = now_millis();
    let id = snowflake_id().to_string();

    debug!(
        order_id = %id,
        items = items.len(),
        stores = store_keys.len(),
        %items_total,
        %delivery_fee,
        %grand_total,
        "[Builder] Order built from submission"
    );

    Ok(Order {
        id,
        customer: Customer {
            name: submission.name.trim().to_string(),
            phone: submission.phone.trim().to_string(),
            address: submission.address.trim().to_string(),
            district: submission.district.trim().to_string(),
            comment: submission
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        },
        payment: submission.payment,
        items,
        store_keys,
        totals: Totals {
            items_total,
            delivery_fee,
            grand_total,
        },
        status: OrderStatus::New,
        history: vec![HistoryEntry {
            at: now,
            status: OrderStatus::New,
            actor: "system".to_string(),
        }],
        created_at: now,
        updated_at: now,
    })
}

/// Check the required contact fields, naming the first missing one
fn validate_contact(submission: &OrderSubmission) -> AppResult<()> {
    for (field, value) in [
        ("name", &submission.name),
        ("phone", &submission.phone),
        ("address", &submission.address),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::required_field(field));
        }
    }
    Ok(())
}

/// Collect normalized line items from whichever submission shape is present
fn collect_items(submission: &OrderSubmission, catalog: &Catalog) -> AppResult<Vec<LineItem>> {
    let mut items = Vec::new();

    if !submission.items.is_empty() {
        for raw in &submission.items {
            if raw.quantity == 0 {
                continue;
            }
            check_store_key(&raw.store_key)?;
            items.push(LineItem::new(
                raw.name.clone(),
                raw.store_key.clone(),
                raw.quantity,
                raw.unit_price,
            ));
        }
        return Ok(items);
    }

    // Legacy carts map. Sorted so repeated submissions produce identical
    // line ordering regardless of map iteration.
    let mut stores: Vec<_> = submission.carts.iter().collect();
    stores.sort_by_key(|(key, _)| key.as_str());
    for (store_key, products) in stores {
        check_store_key(store_key)?;
        let mut products: Vec<_> = products.iter().collect();
        products.sort_by_key(|(name, _)| name.as_str());
        for (name, &quantity) in products {
            if quantity == 0 {
                continue;
            }
            let unit_price = catalog
                .get(store_key)
                .and_then(|prices| prices.get(name))
                .copied()
                .unwrap_or(Decimal::ZERO);
            items.push(LineItem::new(name.clone(), store_key.clone(), quantity, unit_price));
        }
    }
    Ok(items)
}

/// Store keys are embedded in callback action tokens, so the token
/// delimiter is banned here
fn check_store_key(store_key: &str) -> AppResult<()> {
    if store_key.trim().is_empty() {
        return Err(AppError::validation("store key must not be empty"));
    }
    if store_key.contains(':') {
        return Err(
            AppError::validation("store key must not contain ':'")
                .with_detail("store_key", store_key),
        );
    }
    Ok(())
}
