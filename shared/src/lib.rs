//! Shared types for the Foodhub platform
//!
//! Common types used by the hub server and its tests: unified error codes
//! and response envelope, order domain types, and id/time utilities.

pub mod error;
pub mod order;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{Order, OrderStatus, OrderSubmission, PaymentMethod};
