//! Inbound webhook handling
//!
//! - `update`: minimal bot API update deserialization
//! - `token`: action token grammar and parsing
//! - `dispatcher`: validate, apply, acknowledge, re-broadcast

pub mod dispatcher;
pub mod token;
pub mod update;

pub use dispatcher::Dispatcher;
pub use token::{CallbackAction, parse_token};
pub use update::Update;
