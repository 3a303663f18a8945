//! Access control
//!
//! - [`JwtService`] - token verification
//! - [`CurrentUser`] - authenticated caller (id, role, raw token)
//! - [`require_auth`] - authentication middleware
//! - [`require_role`] - role gate middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
pub use middleware::{require_auth, require_role};
