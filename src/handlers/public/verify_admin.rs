// handlers/public/verify_admin.rs - GET /api/verify-admin

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, MaybeUser};
use crate::state::AppState;

/// `true` only for a signed-in ADMIN whose account still exists with that role
pub async fn verify_admin(State(state): State<AppState>, MaybeUser(claims): MaybeUser) -> ApiResult<bool> {
    let Some(claims) = claims else {
        return Ok(ApiResponse::success(false));
    };

    let is_admin = state.store.find_user(claims.sub).await?.map(|u| u.role.is_admin()).unwrap_or(false);
    Ok(ApiResponse::success(is_admin))
}
