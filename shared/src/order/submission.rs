//! Raw storefront submission shapes
//!
//! The storefront posts either an explicit `items` array or the legacy
//! `carts` map. Both arrive as-is here and are normalized into an
//! [`Order`](super::Order) by the hub server's order builder.

use super::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw order submission as posted by the storefront
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSubmission {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub district: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub payment: PaymentMethod,
    /// Legacy shape: store key -> product name -> quantity
    pub carts: HashMap<String, HashMap<String, u32>>,
    /// Explicit shape, wins over `carts` when non-empty
    pub items: Vec<SubmittedItem>,
}

/// One explicit line of the `items` submission shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedItem {
    pub name: String,
    pub store_key: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_deserialize_carts_shape() {
        let json = r#"{
            "name": "Ani",
            "phone": "+37491000000",
            "address": "1 Main St",
            "district": "Kentron",
            "payment": "cash",
            "carts": {"pizzeria": {"Pizza": 2, "Cola": 0}}
        }"#;

        let submission: OrderSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.name, "Ani");
        assert_eq!(submission.payment, PaymentMethod::Cash);
        assert_eq!(submission.carts["pizzeria"]["Pizza"], 2);
        assert!(submission.items.is_empty());
    }

    #[test]
    fn test_deserialize_items_shape() {
        let json = r#"{
            "name": "Ani",
            "phone": "+37491000000",
            "address": "1 Main St",
            "district": "Kentron",
            "payment": "TRANSFER",
            "items": [
                {"name": "Pizza", "storeKey": "pizzeria", "quantity": 2, "unitPrice": 1000}
            ]
        }"#;

        let submission: OrderSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.payment, PaymentMethod::Transfer);
        assert_eq!(submission.items.len(), 1);
        assert_eq!(submission.items[0].store_key, "pizzeria");
        assert_eq!(submission.items[0].unit_price, dec!(1000));
    }

    #[test]
    fn test_missing_fields_default() {
        let submission: OrderSubmission = serde_json::from_str("{}").unwrap();
        assert!(submission.name.is_empty());
        assert!(submission.carts.is_empty());
        assert!(submission.items.is_empty());
        assert_eq!(submission.payment, PaymentMethod::Cash);
    }

    #[test]
    fn test_submitted_item_price_defaults_to_zero() {
        let json = r#"{"name": "Pizza", "storeKey": "pizzeria", "quantity": 1}"#;
        let item: SubmittedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.unit_price, Decimal::ZERO);
    }
}
