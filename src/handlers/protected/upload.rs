// handlers/protected/upload.rs - POST /api/upload (multipart field `file`)

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::assets::{StoredAsset, Upload};
use crate::state::AppState;

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File is too large")
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

pub async fn upload(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<StoredAsset> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let stored = state.assets.store(Upload { file_name, content_type, bytes: bytes.to_vec() }).await?;
        tracing::info!("User {} uploaded {}", claims.sub, stored.file_name);
        return Ok(ApiResponse::created(stored));
    }

    Err(ApiError::invalid_field("file", "No file provided"))
}
