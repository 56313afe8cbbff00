//! Core order domain types
//!
//! An [`Order`] is the canonical record built from a storefront submission:
//! customer contact data, normalized line items, exact money totals, and a
//! status history appended on every transition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================

/// Order status
///
/// `Delivered` and `Cancelled` are terminal; everything else can still move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    PaymentConfirmed,
    Preparing,
    Assembled,
    Picked,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire name (matches the serde representation)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::PaymentConfirmed => "PAYMENT_CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Assembled => "ASSEMBLED",
            Self::Picked => "PICKED",
            Self::OnTheWay => "ON_THE_WAY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Lowercase token name used inside callback action tokens
    pub const fn token(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::Preparing => "preparing",
            Self::Assembled => "assembled",
            Self::Picked => "picked",
            Self::OnTheWay => "on_the_way",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a lowercase token name back into a status
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "new" => Some(Self::New),
            "payment_confirmed" => Some(Self::PaymentConfirmed),
            "preparing" => Some(Self::Preparing),
            "assembled" => Some(Self::Assembled),
            "picked" => Some(Self::Picked),
            "on_the_way" => Some(Self::OnTheWay),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transition is allowed from this status
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payment
// ============================================================================

/// How the customer pays
///
/// Transfer orders gate fulfillment behind an explicit payment confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    #[serde(alias = "cash")]
    Cash,
    /// Bank transfer, confirmed manually by the admin
    #[serde(alias = "transfer")]
    Transfer,
}

impl PaymentMethod {
    /// Wire name (matches the serde representation)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order record
// ============================================================================

/// Customer contact block captured at submission time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
    /// District name used for the delivery fee lookup
    #[serde(default)]
    pub district: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One normalized line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product name as submitted
    pub name: String,
    /// Store the item belongs to
    pub store_key: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// quantity * unit_price
    pub line_total: Decimal,
}

impl LineItem {
    pub fn new(name: impl Into<String>, store_key: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            store_key: store_key.into(),
            quantity,
            unit_price,
            line_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// Exact money totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Totals {
    /// Sum of all line totals
    pub items_total: Decimal,
    /// District delivery fee (zero for unknown districts)
    pub delivery_fee: Decimal,
    /// items_total + delivery_fee
    pub grand_total: Decimal,
}

/// One audit trail entry, appended on creation and on every transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// UTC milliseconds
    pub at: i64,
    pub status: OrderStatus,
    /// Who caused the change ("system", "admin", "store:<key>", "courier")
    pub actor: String,
}

/// Canonical order record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Snowflake ID rendered as decimal digits
    pub id: String,
    pub customer: Customer,
    pub payment: PaymentMethod,
    pub items: Vec<LineItem>,
    /// Distinct store keys over the line items
    pub store_keys: Vec<String>,
    pub totals: Totals,
    pub status: OrderStatus,
    pub history: Vec<HistoryEntry>,
    /// UTC milliseconds
    pub created_at: i64,
    /// UTC milliseconds
    pub updated_at: i64,
}

impl Order {
    /// Compact projection stored in the recency index
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            status: self.status,
        }
    }
}

/// Compact entry of the bounded recency index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub id: String,
    pub created_at: i64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_status_serialize_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::OnTheWay).unwrap();
        assert_eq!(json, "\"ON_THE_WAY\"");

        let json = serde_json::to_string(&OrderStatus::PaymentConfirmed).unwrap();
        assert_eq!(json, "\"PAYMENT_CONFIRMED\"");

        let status: OrderStatus = serde_json::from_str("\"PREPARING\"").unwrap();
        assert_eq!(status, OrderStatus::Preparing);
    }

    #[test]
    fn test_status_token_roundtrip() {
        let all = [
            OrderStatus::New,
            OrderStatus::PaymentConfirmed,
            OrderStatus::Preparing,
            OrderStatus::Assembled,
            OrderStatus::Picked,
            OrderStatus::OnTheWay,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];
        for status in all {
            assert_eq!(OrderStatus::from_token(status.token()), Some(status));
        }
        assert_eq!(OrderStatus::from_token("shipped"), None);
        assert_eq!(OrderStatus::from_token(""), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::OnTheWay.is_terminal());
    }

    #[test]
    fn test_payment_method_aliases() {
        let method: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(method, PaymentMethod::Cash);

        let method: PaymentMethod = serde_json::from_str("\"TRANSFER\"").unwrap();
        assert_eq!(method, PaymentMethod::Transfer);

        let json = serde_json::to_string(&PaymentMethod::Transfer).unwrap();
        assert_eq!(json, "\"TRANSFER\"");
    }

    #[test]
    fn test_line_item_total() {
        let item = LineItem::new("Pizza", "pizzeria", 2, dec!(1000));
        assert_eq!(item.line_total, dec!(2000));

        let item = LineItem::new("Water", "market", 3, dec!(0));
        assert_eq!(item.line_total, dec!(0));
    }

    #[test]
    fn test_order_summary_projection() {
        let order = Order {
            id: "42".to_string(),
            customer: Customer {
                name: "Ani".to_string(),
                phone: "+374".to_string(),
                address: "1 Main St".to_string(),
                district: "Kentron".to_string(),
                comment: None,
            },
            payment: PaymentMethod::Cash,
            items: vec![LineItem::new("Pizza", "pizzeria", 1, dec!(1000))],
            store_keys: vec!["pizzeria".to_string()],
            totals: Totals {
                items_total: dec!(1000),
                delivery_fee: dec!(500),
                grand_total: dec!(1500),
            },
            status: OrderStatus::New,
            history: vec![],
            created_at: 1,
            updated_at: 1,
        };

        let summary = order.summary();
        assert_eq!(summary.id, "42");
        assert_eq!(summary.created_at, 1);
        assert_eq!(summary.status, OrderStatus::New);
    }
}
