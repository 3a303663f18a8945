//! Service-layer error
//!
//! `ServiceError` bridges storage errors (`sqlx::Error`, `BoxError`) and the
//! API-layer `AppError`, so `?` works across both inside the services.

use axum::response::IntoResponse;

use super::codes::ErrorCode;
use super::types::AppError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: storage or infrastructure failure (logged, rendered as InternalError)
/// - `App`: business-rule error, passed through to the client
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Storage error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
