// handlers/elevated/admin.rs - /api/admin/*

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Analytics, UserSummary};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult, ValidJson};
use crate::state::AppState;

/// What an admin removes through moderation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ModerationTarget {
    User(Uuid),
    Property(Uuid),
}

#[derive(Debug, Serialize)]
pub struct ModerationOutcome {
    pub deleted: ModerationTarget,
}

/// GET /api/admin/analytics
pub async fn analytics(State(state): State<AppState>, AdminUser(_): AdminUser) -> ApiResult<Analytics> {
    Ok(ApiResponse::success(state.store.analytics().await?))
}

/// GET /api/admin/users
pub async fn users(State(state): State<AppState>, AdminUser(_): AdminUser) -> ApiResult<Vec<UserSummary>> {
    Ok(ApiResponse::success(state.store.list_users().await?))
}

/// DELETE /api/admin/moderation
pub async fn moderate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(target): ValidJson<ModerationTarget>,
) -> ApiResult<ModerationOutcome> {
    match target {
        ModerationTarget::User(id) => {
            if id == admin.sub {
                return Err(ApiError::invalid_field("id", "Admins cannot delete their own account"));
            }
            state.store.delete_user(id).await?;
        }
        ModerationTarget::Property(id) => state.store.delete_property(id).await?,
    }

    info!("Admin {} removed {:?}", admin.sub, target);
    Ok(ApiResponse::success(ModerationOutcome { deleted: target }))
}
