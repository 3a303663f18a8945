//! Authentication middleware
//!
//! Axum middleware for bearer-token authentication and role gating.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{CurrentUser, JwtService};
use crate::error::AppError;
use crate::models::Role;
use crate::security_log;

/// Require a valid bearer token
///
/// Validates `Authorization: Bearer <token>` and inserts the [`CurrentUser`]
/// into the request extensions. CORS preflight requests pass through.
///
/// | Failure              | Code               | HTTP |
/// |----------------------|--------------------|------|
/// | no header            | `NotAuthenticated` | 401  |
/// | malformed header     | `TokenInvalid`     | 401  |
/// | expired token        | `TokenExpired`     | 401  |
/// | bad signature/claims | `TokenInvalid`     | 401  |
pub async fn require_auth(
    State(jwt): State<JwtService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers(), req.uri())?;
    match jwt.authenticate(token) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );
            Err(e)
        }
    }
}

pub(crate) fn bearer_token<'a>(
    headers: &'a http::HeaderMap,
    uri: &http::Uri,
) -> Result<&'a str, AppError> {
    match headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => {
            security_log!("WARN", "auth_missing", uri = uri.to_string());
            Err(AppError::unauthorized())
        }
    }
}

/// Role gate - the caller must hold one of `roles`
///
/// Must run after [`require_auth`].
///
/// ```ignore
/// Router::new()
///     .route("/approve/{id}", put(approve))
///     .layer(middleware::from_fn(require_role(&[Role::Admin])))
///     .layer(middleware::from_fn_with_state(jwt, require_auth));
/// ```
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if let Err(e) = user.authorize(roles) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id.clone(),
                    user_role = user.role.as_str(),
                    uri = req.uri().to_string()
                );
                return Err(e);
            }

            Ok(next.run(req).await)
        })
    }
}
