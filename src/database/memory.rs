use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::models::{
    Analytics, Checkout, ListingRef, LocationCount, NewUser, Notification, PartyRef, Payment, PaymentStatus,
    ProfileChanges, Property, PropertyChanges, PropertyStatus, PropertyType, RecentTransaction, Reservation,
    Settlement, TypeCount, User, UserSummary, analytics::RECENT_TRANSACTION_LIMIT,
};
use crate::database::store::{settlement_notification, Store, StoreError, TERMS_LOCKED};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    properties: Vec<Property>,
    payments: Vec<Payment>,
    notifications: Vec<Notification>,
}

/// In-process store. Every operation runs under a single lock, which gives the
/// same atomicity the Postgres store gets from transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            federated_id: user.federated_id,
            image: None,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(image) = changes.image {
            user.image = image;
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
                created_at: u.created_at,
                property_count: tables.properties.iter().filter(|p| p.user_id == u.id).count() as i64,
                payment_count: tables.payments.iter().filter(|p| p.user_id == u.id).count() as i64,
            })
            .collect())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        let owned: Vec<Uuid> = tables.properties.iter().filter(|p| p.user_id == id).map(|p| p.id).collect();
        let has_payments = tables
            .payments
            .iter()
            .any(|p| p.user_id == id || owned.contains(&p.property_id));
        if has_payments {
            return Err(StoreError::Conflict("User has payment history and cannot be deleted".to_string()));
        }
        tables.notifications.retain(|n| n.user_id != id && !owned.contains(&n.property_id));
        tables.properties.retain(|p| p.user_id != id);
        tables.users.retain(|u| u.id != id);
        Ok(())
    }

    async fn create_property(&self, property: Property) -> Result<Property, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == property.user_id) {
            return Err(StoreError::NotFound("Owner not found".to_string()));
        }
        tables.properties.push(property.clone());
        Ok(property)
    }

    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn list_properties_by_status(&self, status: PropertyStatus) -> Result<Vec<Property>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.properties.iter().rev().filter(|p| p.status == status).cloned().collect())
    }

    async fn list_properties_by_owner(&self, user_id: Uuid) -> Result<Vec<Property>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.properties.iter().rev().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn update_property(&self, id: Uuid, changes: PropertyChanges) -> Result<Property, StoreError> {
        let mut tables = self.tables.lock().await;
        let held = tables.payments.iter().any(|p| p.property_id == id && p.status.holds_property());
        let property = tables
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound("Property not found".to_string()))?;
        if changes.alters_terms(property) && (held || property.status != PropertyStatus::Available) {
            return Err(StoreError::Conflict(TERMS_LOCKED.to_string()));
        }
        changes.apply(property);
        Ok(property.clone())
    }

    async fn delete_property(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.properties.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound("Property not found".to_string()));
        }
        if tables.payments.iter().any(|p| p.property_id == id) {
            return Err(StoreError::Conflict("Property has payment records and cannot be deleted".to_string()));
        }
        tables.notifications.retain(|n| n.property_id != id);
        tables.properties.retain(|p| p.id != id);
        Ok(())
    }

    async fn reserve(&self, checkout: &Checkout) -> Result<Reservation, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == checkout.payer_id) {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        let property = tables
            .properties
            .iter()
            .find(|p| p.id == checkout.property_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Property not found".to_string()))?;
        let has_active = tables
            .payments
            .iter()
            .any(|p| p.property_id == property.id && p.status.holds_property());
        checkout.check(&property, has_active)?;

        let payment = checkout.pending_payment();
        tables.payments.push(payment.clone());
        Ok(Reservation { payment, property })
    }

    async fn settle(&self, payment_id: Uuid, provider_reference: Option<String>) -> Result<Settlement, StoreError> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))?;
        if payment.status != PaymentStatus::Pending {
            return Err(StoreError::Conflict("Payment is already settled".to_string()));
        }
        let property = tables
            .properties
            .iter_mut()
            .find(|p| p.id == payment.property_id)
            .ok_or_else(|| StoreError::NotFound("Property not found".to_string()))?;
        if property.status != PropertyStatus::Available {
            payment.status = PaymentStatus::Failed;
            return Err(StoreError::Conflict("Property is no longer available".to_string()));
        }

        property.status = payment.payment_type.settled_status();
        payment.status = PaymentStatus::Completed;
        payment.provider_reference = provider_reference;

        let notification = settlement_notification(payment, property);
        let settlement = Settlement {
            payment: payment.clone(),
            property: property.clone(),
            notification: notification.clone(),
        };
        tables.notifications.push(notification);
        Ok(settlement)
    }

    async fn fail_payment(&self, payment_id: Uuid) -> Result<Payment, StoreError> {
        let mut tables = self.tables.lock().await;
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))?;
        if payment.status == PaymentStatus::Completed {
            return Err(StoreError::Conflict("Completed payments cannot be failed".to_string()));
        }
        payment.status = PaymentStatus::Failed;
        Ok(payment.clone())
    }

    async fn list_payments_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.payments.iter().rev().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn list_unread_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && !n.read)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, StoreError> {
        let mut tables = self.tables.lock().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound("Notification not found".to_string()))?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn analytics(&self) -> Result<Analytics, StoreError> {
        let tables = self.tables.lock().await;

        let mut by_type: BTreeMap<&'static str, (PropertyType, i64)> = BTreeMap::new();
        let mut by_location: BTreeMap<String, i64> = BTreeMap::new();
        for property in &tables.properties {
            let key = match property.property_type {
                PropertyType::Rent => "RENT",
                PropertyType::Sale => "SALE",
            };
            by_type.entry(key).or_insert((property.property_type, 0)).1 += 1;
            *by_location.entry(property.location.clone()).or_insert(0) += 1;
        }

        let recent_transactions = tables
            .payments
            .iter()
            .rev()
            .filter_map(|payment| {
                let user = tables.users.iter().find(|u| u.id == payment.user_id)?;
                let property = tables.properties.iter().find(|p| p.id == payment.property_id)?;
                Some(RecentTransaction {
                    id: payment.id,
                    amount: payment.amount,
                    status: payment.status,
                    payment_type: payment.payment_type,
                    created_at: payment.created_at,
                    user: PartyRef { id: user.id, name: user.name.clone(), email: user.email.clone() },
                    property: ListingRef {
                        id: property.id,
                        title: property.title.clone(),
                        location: property.location.clone(),
                    },
                })
            })
            .take(RECENT_TRANSACTION_LIMIT)
            .collect();

        Ok(Analytics {
            total_users: tables.users.len() as i64,
            total_properties: tables.properties.len() as i64,
            total_payments: tables.payments.len() as i64,
            properties_by_type: by_type
                .into_values()
                .map(|(property_type, count)| TypeCount { property_type, count })
                .collect(),
            properties_by_location: by_location
                .into_iter()
                .map(|(location, count)| LocationCount { location, count })
                .collect(),
            recent_transactions,
        })
    }
}
