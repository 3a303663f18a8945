//! Error system shared by the delivery platform services
//!
//! - [`ErrorCode`]: numeric code per failure kind, grouped by range
//! - [`ErrorCategory`]: range classification
//! - [`AppError`]: code, message and structured details
//! - `ServiceError` (feature `db`): storage failures or `AppError`, inside the services
//!
//! Code ranges: 0xxx general, 1xxx auth, 2xxx permission, 3xxx restaurant,
//! 4xxx order, 5xxx payment, 9xxx system.
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::OrderEmpty).with_detail("field", "items");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 4007);
//! ```

mod category;
mod codes;
mod http;
#[cfg(feature = "db")]
mod service;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
#[cfg(feature = "db")]
pub use service::{ServiceError, ServiceResult};
pub use types::{AppError, AppResult, ErrorBody};
