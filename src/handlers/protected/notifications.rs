// handlers/protected/notifications.rs

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::Notification;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/notifications - unread, newest first
pub async fn unread(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Vec<Notification>> {
    let notifications = state.store.list_unread_notifications(claims.sub).await?;
    Ok(ApiResponse::success(notifications))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Notification> {
    let notification = state.store.mark_notification_read(id, claims.sub).await?;
    Ok(ApiResponse::success(notification))
}
