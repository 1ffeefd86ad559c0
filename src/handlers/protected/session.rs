// handlers/protected/session.rs - GET /api/auth/session

use crate::auth::Claims;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Claims of the current session
pub async fn whoami(AuthUser(claims): AuthUser) -> ApiResult<Claims> {
    Ok(ApiResponse::success(claims))
}
