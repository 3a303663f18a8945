//! CurrentUser extractor
//!
//! Handlers can take [`CurrentUser`] as an argument. If [`require_auth`]
//! already ran the user is taken from the extensions, otherwise the token is
//! validated here.
//!
//! [`require_auth`]: super::require_auth

use axum::extract::{FromRef, FromRequestParts};
use http::request::Parts;

use super::middleware::bearer_token;
use super::{CurrentUser, JwtService};
use crate::error::AppError;
use crate::security_log;

impl<S> FromRequestParts<S> for CurrentUser
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers, &parts.uri)?;
        let jwt = JwtService::from_ref(state);
        match jwt.authenticate(token) {
            Ok(user) => {
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = e.to_string(),
                    uri = parts.uri.to_string()
                );
                Err(e)
            }
        }
    }
}
