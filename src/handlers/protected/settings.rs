// handlers/protected/settings.rs - GET/PUT /api/settings/profile

use axum::extract::State;
use serde::{Deserialize, Deserializer};

use crate::database::models::{ProfileChanges, User};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    /// Absent leaves the image alone, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub async fn show(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<User> {
    let user = state.store.find_user(claims.sub).await?.ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(body): ValidJson<ProfileRequest>,
) -> ApiResult<User> {
    let name = body.name.map(|n| n.trim().to_string());
    let image = body.image.map(|i| i.filter(|url| !url.trim().is_empty()));

    FieldErrors::new()
        .check("name", name.as_deref().map(|n| !n.is_empty()).unwrap_or(true), "name must not be empty")
        .finish("Invalid profile")?;

    let user = state.store.update_profile(claims.sub, ProfileChanges { name, image }).await?;
    Ok(ApiResponse::success(user))
}
