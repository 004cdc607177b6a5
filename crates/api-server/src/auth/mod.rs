//! Bearer-token auth resolving the acting user.
//!
//! The caller's identity is established here, upstream of the service
//! layer; handlers never read an owner id out of a request body.

mod jwt;

pub use jwt::{issue_user_jwt, verify_user_jwt, UserJwtClaims};

use axum::http::{header, HeaderMap};

/// Resolve the acting user id from the `Authorization: Bearer` header
pub fn resolve_user_id(headers: &HeaderMap) -> Result<u64, String> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header must be a Bearer token".to_string())?;

    let claims = verify_user_jwt(token)?;
    claims
        .sub
        .parse::<u64>()
        .map_err(|_| "JWT subject is not a numeric user id".to_string())
}
