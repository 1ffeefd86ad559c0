use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::notification::Notification;
use super::property::{Property, PropertyStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Pending and completed payments hold the property; failed ones release it.
    pub fn holds_property(self) -> bool {
        !matches!(self, PaymentStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Rent,
    Purchase,
}

impl PaymentType {
    /// Property status after a completed payment of this kind
    pub fn settled_status(self) -> PropertyStatus {
        match self {
            PaymentType::Rent => PropertyStatus::Rented,
            PaymentType::Purchase => PropertyStatus::Sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub payment_type: PaymentType,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A checkout request as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub property_id: Uuid,
    pub payer_id: Uuid,
    pub payment_type: PaymentType,
    pub amount: Decimal,
}

/// Reasons a property cannot be reserved for a checkout
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckoutRejection {
    #[error("Property is no longer available")]
    NotAvailable,
    #[error("Property already has a payment in progress")]
    AlreadyReserved,
    #[error("This listing cannot be paid for with action '{requested:?}'")]
    WrongAction { requested: PaymentType },
    #[error("Amount must match the listed price of {expected}")]
    AmountMismatch { expected: Decimal },
    #[error("You cannot pay for your own listing")]
    OwnListing,
}

impl Checkout {
    /// Rules applied by every store while the property row is held.
    /// `has_active_payment` is whether a pending or completed payment already exists.
    pub fn check(&self, property: &Property, has_active_payment: bool) -> Result<(), CheckoutRejection> {
        if property.status != PropertyStatus::Available {
            return Err(CheckoutRejection::NotAvailable);
        }
        if has_active_payment {
            return Err(CheckoutRejection::AlreadyReserved);
        }
        if property.property_type.accepted_payment() != self.payment_type {
            return Err(CheckoutRejection::WrongAction { requested: self.payment_type });
        }
        if property.price != self.amount {
            return Err(CheckoutRejection::AmountMismatch { expected: property.price });
        }
        if property.user_id == self.payer_id {
            return Err(CheckoutRejection::OwnListing);
        }
        Ok(())
    }

    pub fn pending_payment(&self) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            amount: self.amount,
            status: PaymentStatus::Pending,
            payment_type: self.payment_type,
            property_id: self.property_id,
            user_id: self.payer_id,
            provider_reference: None,
            created_at: Utc::now(),
        }
    }
}

/// Result of a reservation: the pending payment plus the property it holds
#[derive(Debug, Clone)]
pub struct Reservation {
    pub payment: Payment,
    pub property: Property,
}

/// Result of a settled checkout
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub payment: Payment,
    pub property: Property,
    pub notification: Notification,
}
