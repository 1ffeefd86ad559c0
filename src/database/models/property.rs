use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::payment::PaymentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "property_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Rent,
    Sale,
}

impl PropertyType {
    /// The payment kind a listing of this type accepts
    pub fn accepted_payment(self) -> PaymentType {
        match self {
            PropertyType::Rent => PaymentType::Rent,
            PropertyType::Sale => PaymentType::Purchase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "property_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub image_urls: Vec<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Listing attributes supplied by the owner on create. Status is always AVAILABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub image_urls: Vec<String>,
    pub property_type: PropertyType,
}

impl NewProperty {
    pub fn into_property(self, user_id: Uuid) -> Property {
        Property {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            image_urls: self.image_urls,
            property_type: self.property_type,
            status: PropertyStatus::Available,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Owner edit. Absent fields are left alone; status is not editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    pub property_type: Option<PropertyType>,
}

impl PropertyChanges {
    /// Whether the edit moves the price or type a checkout is made against
    pub fn alters_terms(&self, property: &Property) -> bool {
        self.price.is_some_and(|price| price != property.price)
            || self.property_type.is_some_and(|kind| kind != property.property_type)
    }

    pub fn apply(self, property: &mut Property) {
        if let Some(v) = self.title {
            property.title = v;
        }
        if let Some(v) = self.description {
            property.description = v;
        }
        if let Some(v) = self.price {
            property.price = v;
        }
        if let Some(v) = self.location {
            property.location = v;
        }
        if let Some(v) = self.bedrooms {
            property.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            property.bathrooms = v;
        }
        if let Some(v) = self.area {
            property.area = v;
        }
        if let Some(v) = self.image_urls {
            property.image_urls = v;
        }
        if let Some(v) = self.property_type {
            property.property_type = v;
        }
    }
}
