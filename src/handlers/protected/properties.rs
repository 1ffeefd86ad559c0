// handlers/protected/properties.rs - listing management for signed-in owners

use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::{NewProperty, Property, PropertyChanges, PropertyType};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

/// Create and edit body. Create requires every field except `image_urls`.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    /// Never editable; present only so it can be refused explicitly
    pub status: Option<Value>,
}

impl PropertyInput {
    /// Range checks on whichever fields are present
    fn check_values(&self, errors: &mut FieldErrors) {
        if let Some(title) = &self.title {
            errors.check("title", !title.trim().is_empty(), "title must not be empty");
        }
        if let Some(location) = &self.location {
            errors.check("location", !location.trim().is_empty(), "location must not be empty");
        }
        if let Some(price) = self.price {
            errors.money("price", price);
        }
        if let Some(bedrooms) = self.bedrooms {
            errors.check("bedrooms", bedrooms >= 0, "bedrooms must not be negative");
        }
        if let Some(bathrooms) = self.bathrooms {
            errors.check("bathrooms", bathrooms >= 0, "bathrooms must not be negative");
        }
        if let Some(area) = self.area {
            errors.check("area", area.is_finite() && area > 0.0, "area must be greater than 0");
        }
        if let Some(urls) = &self.image_urls {
            errors.check("image_urls", urls.iter().all(|u| !u.trim().is_empty()), "image URLs must not be empty");
        }
        errors.check("status", self.status.is_none(), "status cannot be edited");
    }

    fn into_new_property(self) -> Result<NewProperty, ApiError> {
        let mut errors = FieldErrors::new();
        errors
            .require("title", self.title.as_deref())
            .require("description", self.description.as_deref())
            .require("location", self.location.as_deref())
            .check("price", self.price.is_some(), "price is required")
            .check("bedrooms", self.bedrooms.is_some(), "bedrooms is required")
            .check("bathrooms", self.bathrooms.is_some(), "bathrooms is required")
            .check("area", self.area.is_some(), "area is required")
            .check("type", self.property_type.is_some(), "type is required");
        self.check_values(&mut errors);
        errors.finish("Invalid property")?;

        Ok(NewProperty {
            title: self.title.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            location: self.location.unwrap_or_default().trim().to_string(),
            bedrooms: self.bedrooms.unwrap_or_default(),
            bathrooms: self.bathrooms.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            image_urls: self.image_urls.unwrap_or_default(),
            property_type: self.property_type.unwrap_or(PropertyType::Sale),
        })
    }

    fn into_changes(self) -> Result<PropertyChanges, ApiError> {
        let mut errors = FieldErrors::new();
        self.check_values(&mut errors);
        errors.finish("Invalid property")?;

        Ok(PropertyChanges {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            price: self.price,
            location: self.location.map(|l| l.trim().to_string()),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            image_urls: self.image_urls,
            property_type: self.property_type,
        })
    }
}

async fn load(state: &AppState, id: Uuid) -> Result<Property, ApiError> {
    state.store.find_property(id).await?.ok_or_else(|| ApiError::not_found("Property not found"))
}

fn ensure_owner(property: &Property, claims: &Claims) -> Result<(), ApiError> {
    if property.user_id != claims.sub {
        tracing::warn!("User {} refused access to property {}", claims.sub, property.id);
        return Err(ApiError::forbidden("You do not own this property"));
    }
    Ok(())
}

/// POST /api/properties
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(body): ValidJson<PropertyInput>,
) -> ApiResult<Property> {
    let property = body.into_new_property()?.into_property(claims.sub);
    let property = state.store.create_property(property).await?;
    info!("User {} listed property {}", claims.sub, property.id);
    Ok(ApiResponse::created(property))
}

/// GET /api/properties/user
pub async fn mine(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Vec<Property>> {
    let properties = state.store.list_properties_by_owner(claims.sub).await?;
    Ok(ApiResponse::success(properties))
}

/// PUT /api/properties/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<PropertyInput>,
) -> ApiResult<Property> {
    let existing = load(&state, id).await?;
    ensure_owner(&existing, &claims)?;

    let updated = state.store.update_property(id, body.into_changes()?).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/properties/:id - owner or ADMIN
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let existing = load(&state, id).await?;
    if !claims.is_admin() {
        ensure_owner(&existing, &claims)?;
    }

    state.store.delete_property(id).await?;
    info!("User {} deleted property {}", claims.sub, id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
