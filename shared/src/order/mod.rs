//! Order Domain Module
//!
//! This module provides the order types shared between the hub server and
//! its tests:
//! - Submissions: raw shapes posted by the storefront
//! - Orders: canonical normalized records with totals and history

pub mod submission;
pub mod types;

// Re-exports
pub use submission::{OrderSubmission, SubmittedItem};
pub use types::{Customer, HistoryEntry, LineItem, Order, OrderStatus, OrderSummary, PaymentMethod, Totals};
