// handlers/public/session.rs - sign-in and sign-out
//
// Both sign-in paths end the same way: a session token is issued, set as the
// HttpOnly session cookie and returned in the body for Bearer clients.

use axum::{extract::State, http::header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::credentials::{authenticate_federated, authenticate_password};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::validate::{normalize_email, FieldErrors};
use crate::middleware::session::{cleared_cookie, session_cookie};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FederatedSignInRequest {
    pub assertion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionGrant {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub user: User,
}

fn grant(state: &AppState, user: User) -> ApiResult<SessionGrant> {
    let (token, claims) = state.keys.issue(&user)?;
    let cookie = session_cookie(&token, state.keys.expiry_hours(), state.secure_cookies)
        .ok_or_else(|| ApiError::internal_server_error("Failed to create session"))?;

    info!("Session issued for {} ({:?})", claims.sub, claims.role);
    Ok(ApiResponse::success(SessionGrant { token, expires_in: state.keys.expiry_hours() * 3600, user })
        .with_header(header::SET_COOKIE, cookie))
}

/// POST /api/auth/signin
pub async fn signin(State(state): State<AppState>, ValidJson(body): ValidJson<SignInRequest>) -> ApiResult<SessionGrant> {
    FieldErrors::new()
        .require("email", body.email.as_deref())
        .require("password", body.password.as_deref())
        .finish("Invalid credentials")?;

    let email = normalize_email(body.email.as_deref().unwrap_or_default());
    let user = authenticate_password(state.store.as_ref(), &email, body.password.as_deref().unwrap_or_default())
        .await?;
    grant(&state, user)
}

/// POST /api/auth/federated
pub async fn federated_signin(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<FederatedSignInRequest>,
) -> ApiResult<SessionGrant> {
    FieldErrors::new().require("assertion", body.assertion.as_deref()).finish("Invalid credentials")?;

    let user = authenticate_federated(
        state.store.as_ref(),
        state.verifier.as_ref(),
        body.assertion.as_deref().unwrap_or_default(),
    )
    .await?;
    grant(&state, user)
}

/// POST /api/auth/signout
pub async fn signout(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "signed_out": true }))
        .with_header(header::SET_COOKIE, cleared_cookie(state.secure_cookies)))
}
