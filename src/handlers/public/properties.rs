// handlers/public/properties.rs - GET /api/properties, GET /api/properties/:id

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::{Property, PropertyStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// AVAILABLE listings, newest first
pub async fn list_available(State(state): State<AppState>) -> ApiResult<Vec<Property>> {
    let properties = state.store.list_properties_by_status(PropertyStatus::Available).await?;
    Ok(ApiResponse::success(properties))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Property> {
    let property = state
        .store
        .find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    Ok(ApiResponse::success(property))
}
