//! Auth endpoints
//!
//! Development-grade token issuance: exchanges a user id for a signed
//! bearer JWT that the task endpoints accept. Real identity federation
//! lives outside this service.

use axum::{http::StatusCode, routing::post, Json, Router};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::auth::issue_user_jwt;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    user_id: u64,
    #[serde(default)]
    ttl_hours: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    expires_at: String,
    user_id: u64,
}

/// POST /api/auth/token - Issue a bearer token for a user id
async fn issue_token(Json(req): Json<TokenRequest>) -> Result<Json<TokenResponse>, RouteError> {
    if req.user_id == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "userId must be non-zero".to_string(),
            }),
        ));
    }

    let ttl_hours = req.ttl_hours.unwrap_or(24).clamp(1, 24 * 30);
    let (token, exp) = issue_user_jwt(req.user_id, ttl_hours).map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: err }),
        )
    })?;

    let expires_at = DateTime::from_timestamp(exp as i64, 0)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default();

    Ok(Json(TokenResponse {
        token,
        expires_at,
        user_id: req.user_id,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/token", post(issue_token))
}
