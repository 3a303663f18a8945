//! JWT token service
//!
//! Verifies the identity token shared by every service. Tokens are issued by
//! the user service; [`JwtService::issue`] exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::Role;

/// Claims carried by the identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub role: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issued at, seconds since epoch
    pub iat: i64,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

impl From<JwtError> for AppError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::GenerationFailed(msg) => AppError::internal(msg),
            _ => AppError::invalid_token("Invalid token"),
        }
    }
}

/// HS256 token service keyed by the shared secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for `user_id` valid for `ttl`
    pub fn issue(&self, user_id: &str, role: Role, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Verify signature and expiry, then decode the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Full check: header value to [`CurrentUser`]
    pub fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims = self.validate_token(token)?;
        let mut user = CurrentUser::try_from(claims)?;
        user.token = token.to_string();
        Ok(user)
    }

    /// Strip the `Bearer ` prefix from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Authenticated caller
///
/// Injected by [`require_auth`](super::require_auth) or extracted directly in
/// handlers. `token` is the raw credential, forwarded to collaborators that
/// need to act on the caller's behalf.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
    pub token: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.user_id.is_empty() {
            return Err(AppError::invalid_token("Token carries no user id"));
        }
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
        Ok(Self {
            id: claims.user_id,
            role,
            token: String::new(),
        })
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// `Ok` when the caller holds one of `roles`
    pub fn authorize(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            return Ok(());
        }
        let required = roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Access denied: requires role {required}"),
        )
        .with_detail("role", self.role.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-length-000000";

    #[test]
    fn issue_and_validate() {
        let service = JwtService::new(SECRET);
        let token = service
            .issue("user123", Role::RestaurantAdmin, Duration::hours(1))
            .unwrap();

        let user = service.authenticate(&token).unwrap();
        assert_eq!(user.id, "user123");
        assert_eq!(user.role, Role::RestaurantAdmin);
        assert_eq!(user.token, token);
    }

    #[test]
    fn claims_use_camel_case() {
        let service = JwtService::new(SECRET);
        let token = service.issue("u1", Role::Customer, Duration::hours(1)).unwrap();
        let claims = service.validate_token(&token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["role"], "customer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::new(SECRET);
        let token = service
            .issue("u1", Role::Customer, Duration::minutes(-5))
            .unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
        let err = service.authenticate(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = JwtService::new(SECRET);
        let theirs = JwtService::new("some-other-secret-entirely-000000000");
        let token = theirs.issue("u1", Role::Admin, Duration::hours(1)).unwrap();
        let err = ours.authenticate(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn garbage_is_rejected() {
        let service = JwtService::new(SECRET);
        let err = service.authenticate("not.a.jwt").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn unknown_role_is_invalid() {
        let claims = Claims {
            user_id: "u1".into(),
            role: "owner".into(),
            exp: 0,
            iat: 0,
        };
        let err = CurrentUser::try_from(claims).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn header_extraction() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn authorize_by_role_set() {
        let user = CurrentUser {
            id: "u1".into(),
            role: Role::Customer,
            token: String::new(),
        };
        assert!(user.authorize(&[Role::Customer]).is_ok());
        assert!(user.authorize(&[Role::Customer, Role::Admin]).is_ok());
        let err = user.authorize(&[Role::RestaurantAdmin]).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }
}
