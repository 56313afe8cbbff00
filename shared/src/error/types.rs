//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type for the hub server, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a required-field error naming the missing field
    pub fn required_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self::with_message(
            ErrorCode::RequiredField,
            format!("missing required field: {}", f),
        )
        .with_detail("field", f)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an order not found error
    pub fn order_not_found(id: impl Into<String>) -> Self {
        Self::new(ErrorCode::OrderNotFound).with_detail("order_id", id.into())
    }

    /// Create an empty-order error
    pub fn order_empty() -> Self {
        Self::new(ErrorCode::OrderEmpty)
    }

    /// Create an illegal transition error recording both statuses
    pub fn illegal_transition(current: impl Into<String>, requested: impl Into<String>) -> Self {
        let current = current.into();
        let requested = requested.into();
        Self::with_message(
            ErrorCode::IllegalTransition,
            format!("cannot transition from {} to {}", current, requested),
        )
        .with_detail("current", current)
        .with_detail("requested", requested)
    }

    /// Create an already-final error
    pub fn already_final(current: impl Into<String>) -> Self {
        Self::new(ErrorCode::OrderAlreadyFinal).with_detail("current", current.into())
    }

    /// Create an unknown status error
    pub fn unknown_status(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::with_message(ErrorCode::UnknownStatus, format!("unknown status: {}", raw))
            .with_detail("status", raw)
    }

    /// Create an unauthorized error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid API key error
    pub fn invalid_api_key() -> Self {
        Self::new(ErrorCode::InvalidApiKey)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create a delivery failure error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DeliveryFailed, msg)
    }

    /// Create a chat-not-mapped error for a store key
    pub fn chat_not_mapped(store_key: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChatNotMapped).with_detail("store_key", store_key.into())
    }

    /// Create an invalid callback token error
    pub fn callback_invalid(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::CallbackInvalid, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigurationError, msg)
    }
}

/// Unified API response envelope
///
/// Every HTTP endpoint answers with this shape:
/// - `ok`: `true` on success, `false` on failure
/// - `code`: machine-readable error code (absent on success)
/// - `error`: human-readable message (absent on success)
/// - payload fields are flattened into the envelope on success
/// - `details`: additional error details (absent on success)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Success flag
    pub ok: bool,
    /// Error code (absent on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable error message (absent on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response payload, flattened into the envelope (absent on failure)
    #[serde(flatten)]
    pub data: Option<T>,
    /// Additional error details (absent on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with a payload
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            code: None,
            error: None,
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without a payload
    pub fn ok() -> Self {
        Self {
            ok: true,
            code: None,
            error: None,
            data: None,
            details: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            ok: false,
            code: Some(err.code.code()),
            error: Some(err.message.clone()),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            ok: false,
            code: Some(err.code.code()),
            error: Some(err.message),
            data: None,
            details: err.details,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use super::codes::ErrorCode;
        use axum::Json;

        let status = if self.ok {
            http::StatusCode::OK
        } else {
            self.code
                .and_then(|c| ErrorCode::try_from(c).ok())
                .map(|c| c.http_status())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
        };

        (status, Json(self)).into_response()
    }
}
