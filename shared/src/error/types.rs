//! Application error and its JSON body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler and collaborator client
///
/// `code` decides the HTTP status, `message` is shown to the caller and
/// `details` carries structured context such as the offending field.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the default message of `code`
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Missing required field, named in `details.field`
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Missing bearer token
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn collaborator_unavailable(collaborator: &str, msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::CollaboratorUnavailable, msg)
            .with_detail("collaborator", collaborator)
    }

    pub fn payment_provider(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PaymentProviderError, msg)
    }
}

/// Wire shape of an error: `{code, message, details?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, error = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    #[test]
    fn default_message_comes_from_code() {
        let err = AppError::new(ErrorCode::OrderEmpty);
        assert_eq!(err.message, "Order has no items");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "Order has no items");
    }

    #[test]
    fn details_accumulate() {
        let err = AppError::validation("Invalid phone number format")
            .with_detail("field", "phone")
            .with_detail("value", "12");
        let details = err.details.unwrap();
        assert_eq!(details["field"], "phone");
        assert_eq!(details["value"], "12");
    }

    #[test]
    fn required_names_the_field() {
        let err = AppError::required("restaurantId");
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "restaurantId is required");
        assert_eq!(err.details.unwrap()["field"], "restaurantId");
    }

    #[test]
    fn collaborator_and_provider_statuses() {
        let err = AppError::collaborator_unavailable("identity", "identity service timed out");
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.details.unwrap()["collaborator"], "identity");

        let err = AppError::payment_provider("Your card was declined.");
        assert_eq!(err.http_status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn body_omits_empty_details() {
        let json = serde_json::to_value(ErrorBody::from(&AppError::token_expired())).unwrap();
        assert_eq!(json, serde_json::json!({"code": 1003, "message": "Authentication token has expired"}));
    }

    #[tokio::test]
    async fn renders_status_and_body() {
        let resp = AppError::required("items").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, ErrorCode::RequiredField.code());
        assert_eq!(body.message, "items is required");
    }
}
