//! Callback action tokens
//!
//! Inline keyboard buttons carry colon-delimited tokens of the form
//! `o:<order-id>:<action>[:<param>...]`. They are parsed here, at the
//! boundary, into [`CallbackAction`]; nothing downstream touches the raw
//! string. Order ids and store keys are colon-free by construction, so the
//! delimiter is unambiguous.

use shared::order::OrderStatus;

/// A parsed inbound action request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Admin confirmed a transfer payment
    ConfirmPayment { order_id: String },
    /// A recipient requested a status transition; `store_key` is present on
    /// store-originated buttons
    SetStatus {
        order_id: String,
        status: OrderStatus,
        store_key: Option<String>,
    },
    /// Administrative cancel
    Cancel { order_id: String },
}

impl CallbackAction {
    pub fn order_id(&self) -> &str {
        match self {
            Self::ConfirmPayment { order_id }
            | Self::SetStatus { order_id, .. }
            | Self::Cancel { order_id } => order_id,
        }
    }

    /// History actor string implied by the button that carried the token
    pub fn actor(&self) -> String {
        match self {
            Self::ConfirmPayment { .. } | Self::Cancel { .. } => "admin".to_string(),
            Self::SetStatus {
                store_key: Some(key),
                ..
            } => format!("store:{key}"),
            Self::SetStatus { status, .. } => match status {
                OrderStatus::Picked | OrderStatus::OnTheWay | OrderStatus::Delivered => {
                    "courier".to_string()
                }
                _ => "admin".to_string(),
            },
        }
    }
}

/// Parse a raw token; `None` means malformed or unknown
pub fn parse_token(token: &str) -> Option<CallbackAction> {
    let mut parts = token.split(':');
    if parts.next()? != "o" {
        return None;
    }
    let order_id = parts.next()?;
    if order_id.is_empty() {
        return None;
    }

    let action = match parts.next()? {
        "confirm_payment" => CallbackAction::ConfirmPayment {
            order_id: order_id.to_string(),
        },
        "cancel" => CallbackAction::Cancel {
            order_id: order_id.to_string(),
        },
        "set_status" => {
            let status = OrderStatus::from_token(parts.next()?)?;
            let store_key = match parts.next() {
                Some(key) if !key.is_empty() => Some(key.to_string()),
                Some(_) => return None,
                None => None,
            };
            CallbackAction::SetStatus {
                order_id: order_id.to_string(),
                status,
                store_key,
            }
        }
        _ => return None,
    };

    // Trailing fields invalidate the token
    if parts.next().is_some() {
        return None;
    }
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_status() {
        assert_eq!(
            parse_token("o:ord123:set_status:assembled"),
            Some(CallbackAction::SetStatus {
                order_id: "ord123".to_string(),
                status: OrderStatus::Assembled,
                store_key: None,
            })
        );
    }

    #[test]
    fn test_parse_set_status_with_store_key() {
        assert_eq!(
            parse_token("o:500:set_status:assembled:pizzeria"),
            Some(CallbackAction::SetStatus {
                order_id: "500".to_string(),
                status: OrderStatus::Assembled,
                store_key: Some("pizzeria".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_confirm_payment_and_cancel() {
        assert_eq!(
            parse_token("o:500:confirm_payment"),
            Some(CallbackAction::ConfirmPayment {
                order_id: "500".to_string()
            })
        );
        assert_eq!(
            parse_token("o:500:cancel"),
            Some(CallbackAction::Cancel {
                order_id: "500".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in [
            "",
            "o",
            "o:",
            "o:500",
            "x:500:cancel",
            "o:500:unknown_action",
            "o:500:set_status",
            "o:500:set_status:not_a_status",
            "o:500:set_status:assembled:",
            "o:500:cancel:extra",
            "o::cancel",
        ] {
            assert_eq!(parse_token(token), None, "token {token:?} should be rejected");
        }
    }

    #[test]
    fn test_actor_derivation() {
        assert_eq!(parse_token("o:1:cancel").unwrap().actor(), "admin");
        assert_eq!(
            parse_token("o:1:set_status:assembled:grill").unwrap().actor(),
            "store:grill"
        );
        assert_eq!(
            parse_token("o:1:set_status:picked").unwrap().actor(),
            "courier"
        );
        assert_eq!(
            parse_token("o:1:set_status:preparing").unwrap().actor(),
            "admin"
        );
    }
}
