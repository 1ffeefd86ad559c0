use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::{PaymentStatus, PaymentType};
use super::property::PropertyType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    pub total_users: i64,
    pub total_properties: i64,
    pub total_payments: i64,
    pub properties_by_type: Vec<TypeCount>,
    pub properties_by_location: Vec<LocationCount>,
    pub recent_transactions: Vec<RecentTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub created_at: DateTime<Utc>,
    pub user: PartyRef,
    pub property: ListingRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRef {
    pub id: Uuid,
    pub title: String,
    pub location: String,
}

/// Number of transactions included in the analytics summary
pub const RECENT_TRANSACTION_LIMIT: usize = 10;
