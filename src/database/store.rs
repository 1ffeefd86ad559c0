use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Analytics, Checkout, CheckoutRejection, Notification, NewUser, Payment, ProfileChanges, Property,
    PropertyChanges, PropertyStatus, Reservation, Settlement, User, UserSummary,
};

/// Errors from a `Store` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Rejected(#[from] CheckoutRejection),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence boundary for users, properties, payments and notifications.
///
/// Every method is one logical operation. Methods that touch more than one
/// record (reservation, settlement, cascading deletes) are atomic.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    // Users
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;
    /// Fails with `Conflict` when the user has payments as payer or on an owned listing.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    // Properties
    async fn create_property(&self, property: Property) -> Result<Property, StoreError>;
    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, StoreError>;
    async fn list_properties_by_status(&self, status: PropertyStatus) -> Result<Vec<Property>, StoreError>;
    async fn list_properties_by_owner(&self, user_id: Uuid) -> Result<Vec<Property>, StoreError>;
    /// Fails with `Conflict` when price or type would change on a property that is
    /// no longer AVAILABLE or is held by an active payment.
    async fn update_property(&self, id: Uuid, changes: PropertyChanges) -> Result<Property, StoreError>;
    /// Fails with `Conflict` when any payment references the property.
    async fn delete_property(&self, id: Uuid) -> Result<(), StoreError>;

    // Payments
    /// Hold the property for `checkout` and record a PENDING payment.
    async fn reserve(&self, checkout: &Checkout) -> Result<Reservation, StoreError>;
    /// Flip the property, complete the payment and notify the owner, all or nothing.
    /// A property that is no longer AVAILABLE fails the payment and returns `Conflict`.
    async fn settle(&self, payment_id: Uuid, provider_reference: Option<String>) -> Result<Settlement, StoreError>;
    async fn fail_payment(&self, payment_id: Uuid) -> Result<Payment, StoreError>;
    async fn list_payments_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>, StoreError>;

    // Notifications
    async fn list_unread_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, StoreError>;
    /// Only the recipient can mark a notification; anything else is `NotFound`.
    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, StoreError>;

    async fn analytics(&self) -> Result<Analytics, StoreError>;
}

/// Notification written for the owner when a checkout settles
pub(crate) const TERMS_LOCKED: &str = "Price and type cannot change once a checkout has started";

pub(crate) fn settlement_notification(payment: &Payment, property: &Property) -> Notification {
    let verb = match payment.payment_type {
        crate::database::models::PaymentType::Rent => "rented",
        crate::database::models::PaymentType::Purchase => "purchased",
    };
    Notification {
        id: Uuid::new_v4(),
        kind: format!("PAYMENT_{:?}", payment.payment_type).to_uppercase(),
        message: format!("Your property \"{}\" was {} for {}", property.title, verb, payment.amount),
        user_id: property.user_id,
        property_id: property.id,
        read: false,
        created_at: chrono::Utc::now(),
    }
}
