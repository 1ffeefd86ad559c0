use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::models::{Checkout, Settlement};
use crate::database::{Store, StoreError};
use crate::services::transfer::{TransferError, TransferProvider, TransferRequest};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Runs a checkout from reservation to settlement.
///
/// The payment is recorded PENDING before the provider is called. The property
/// status only changes together with the payment becoming COMPLETED. A failed
/// transfer marks the payment FAILED and leaves the property AVAILABLE; a
/// transfer with an unknown outcome leaves the payment PENDING.
pub struct CheckoutService<'a> {
    store: &'a dyn Store,
    provider: &'a dyn TransferProvider,
    currency: &'a str,
}

impl<'a> CheckoutService<'a> {
    pub fn new(store: &'a dyn Store, provider: &'a dyn TransferProvider, currency: &'a str) -> Self {
        Self { store, provider, currency }
    }

    pub async fn run(&self, checkout: Checkout, phone_number: Option<String>) -> Result<Settlement, CheckoutError> {
        let reservation = self.store.reserve(&checkout).await?;
        let payment_id = reservation.payment.id;
        info!("Payment {} reserved property {}", payment_id, reservation.property.id);

        let request = TransferRequest {
            reference: payment_id,
            amount: reservation.payment.amount,
            currency: self.currency.to_string(),
            destination: reservation.property.user_id,
            payer: checkout.payer_id,
            phone_number,
        };

        let receipt = match self.provider.transfer(&request).await {
            Ok(receipt) => receipt,
            Err(transfer_err) if transfer_err.is_definite() => {
                warn!("Transfer for payment {} failed: {}", payment_id, transfer_err);
                if let Err(e) = self.store.fail_payment(payment_id).await {
                    error!("Payment {} could not be marked failed and stays PENDING: {}", payment_id, e);
                }
                return Err(transfer_err.into());
            }
            Err(transfer_err) => {
                // Funds may have moved; the property stays held until reconciled
                error!(
                    "Transfer for payment {} has an unknown outcome and stays PENDING: {}",
                    payment_id, transfer_err
                );
                return Err(transfer_err.into());
            }
        };

        match self.store.settle(payment_id, Some(receipt.provider_reference.clone())).await {
            Ok(settlement) => {
                info!(
                    "Payment {} completed; property {} is now {:?}",
                    payment_id, settlement.property.id, settlement.property.status
                );
                Ok(settlement)
            }
            Err(StoreError::Conflict(msg)) => {
                error!(
                    "Payment {} was transferred ({}) but the property moved on; refund required: {}",
                    payment_id, receipt.provider_reference, msg
                );
                Err(StoreError::Conflict(msg).into())
            }
            Err(e) => {
                // Funds moved; keep PENDING so the payment can be reconciled
                error!(
                    "Payment {} was transferred ({}) but could not be settled: {}",
                    payment_id, receipt.provider_reference, e
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        CheckoutRejection, NewProperty, NewUser, PaymentStatus, PaymentType, Property, PropertyStatus, PropertyType,
        Role, User,
    };
    use crate::database::MemoryStore;
    use crate::services::transfer::{SimulatedTransferProvider, TransferReceipt};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    struct DecliningProvider;

    #[async_trait]
    impl TransferProvider for DecliningProvider {
        async fn transfer(&self, _request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
            Err(TransferError::Declined("insufficient funds".to_string()))
        }
    }

    struct SilentProvider;

    #[async_trait]
    impl TransferProvider for SilentProvider {
        async fn transfer(&self, _request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
            Err(TransferError::Unconfirmed("completed transfer without id".to_string()))
        }
    }

    async fn user(store: &MemoryStore, email: &str) -> User {
        store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: Some("hash".to_string()),
                federated_id: None,
                role: Role::User,
            })
            .await
            .unwrap()
    }

    async fn listing(store: &MemoryStore, owner: &User, kind: PropertyType) -> Property {
        let property = NewProperty {
            title: "Sea view villa".to_string(),
            description: "Four bedrooms by the beach".to_string(),
            price: Decimal::from(1000),
            location: "Diani".to_string(),
            bedrooms: 4,
            bathrooms: 3,
            area: 320.0,
            image_urls: vec![],
            property_type: kind,
        }
        .into_property(owner.id);
        store.create_property(property).await.unwrap()
    }

    fn order(property: &Property, payer: &User, kind: PaymentType) -> Checkout {
        Checkout { property_id: property.id, payer_id: payer.id, payment_type: kind, amount: Decimal::from(1000) }
    }

    #[tokio::test]
    async fn rent_settles_property_payment_and_notification() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let tenant = user(&store, "tenant@example.com").await;
        let property = listing(&store, &owner, PropertyType::Rent).await;

        let service = CheckoutService::new(&store, &SimulatedTransferProvider, "KES");
        let settlement = service.run(order(&property, &tenant, PaymentType::Rent), None).await.unwrap();

        assert_eq!(settlement.property.status, PropertyStatus::Rented);
        assert_eq!(settlement.payment.status, PaymentStatus::Completed);
        assert_eq!(settlement.payment.amount, Decimal::from(1000));

        let stored = store.find_property(property.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PropertyStatus::Rented);

        let payments = store.list_payments_by_user(tenant.id).await.unwrap();
        let completed: Vec<_> = payments.iter().filter(|p| p.status == PaymentStatus::Completed).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].property_id, property.id);

        let owner_notes = store.list_unread_notifications(owner.id).await.unwrap();
        assert_eq!(owner_notes.len(), 1);
        assert_eq!(owner_notes[0].property_id, property.id);
        assert!(store.list_unread_notifications(tenant.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_marks_property_sold() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let buyer = user(&store, "buyer@example.com").await;
        let property = listing(&store, &owner, PropertyType::Sale).await;

        let service = CheckoutService::new(&store, &SimulatedTransferProvider, "KES");
        let settlement = service.run(order(&property, &buyer, PaymentType::Purchase), None).await.unwrap();
        assert_eq!(settlement.property.status, PropertyStatus::Sold);
    }

    #[tokio::test]
    async fn sold_property_is_conflict_without_payment_record() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let first = user(&store, "first@example.com").await;
        let second = user(&store, "second@example.com").await;
        let property = listing(&store, &owner, PropertyType::Sale).await;

        let service = CheckoutService::new(&store, &SimulatedTransferProvider, "KES");
        service.run(order(&property, &first, PaymentType::Purchase), None).await.unwrap();

        let err = service.run(order(&property, &second, PaymentType::Purchase), None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Store(StoreError::Rejected(CheckoutRejection::NotAvailable))));
        assert!(store.list_payments_by_user(second.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn declined_transfer_fails_payment_and_keeps_property_available() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let tenant = user(&store, "tenant@example.com").await;
        let property = listing(&store, &owner, PropertyType::Rent).await;

        let service = CheckoutService::new(&store, &DecliningProvider, "KES");
        let err = service.run(order(&property, &tenant, PaymentType::Rent), None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Transfer(TransferError::Declined(_))));

        let stored = store.find_property(property.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PropertyStatus::Available);
        let payments = store.list_payments_by_user(tenant.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Failed);
        assert!(store.list_unread_notifications(owner.id).await.unwrap().is_empty());

        // A failed attempt releases the property for the next buyer
        let retry = CheckoutService::new(&store, &SimulatedTransferProvider, "KES");
        assert!(retry.run(order(&property, &tenant, PaymentType::Rent), None).await.is_ok());
    }

    #[tokio::test]
    async fn unconfirmed_transfer_keeps_payment_pending_and_property_held() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let buyer = user(&store, "buyer@example.com").await;
        let other = user(&store, "other@example.com").await;
        let property = listing(&store, &owner, PropertyType::Sale).await;

        let service = CheckoutService::new(&store, &SilentProvider, "KES");
        let err = service.run(order(&property, &buyer, PaymentType::Purchase), None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Transfer(TransferError::Unconfirmed(_))));

        let payments = store.list_payments_by_user(buyer.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        let stored = store.find_property(property.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PropertyStatus::Available);

        let retry = CheckoutService::new(&store, &SimulatedTransferProvider, "KES");
        let err = retry.run(order(&property, &other, PaymentType::Purchase), None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Store(StoreError::Rejected(CheckoutRejection::AlreadyReserved))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checkouts_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let owner = user(&store, "owner@example.com").await;
        let property = listing(&store, &owner, PropertyType::Sale).await;

        let mut buyers = Vec::new();
        for i in 0..8 {
            buyers.push(user(&store, &format!("buyer{}@example.com", i)).await);
        }

        let attempts = buyers.into_iter().map(|buyer| {
            let store = Arc::clone(&store);
            let checkout = Checkout {
                property_id: property.id,
                payer_id: buyer.id,
                payment_type: PaymentType::Purchase,
                amount: Decimal::from(1000),
            };
            tokio::spawn(async move {
                CheckoutService::new(store.as_ref(), &SimulatedTransferProvider, "KES").run(checkout, None).await
            })
        });

        let results: Vec<_> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for loser in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                loser,
                CheckoutError::Store(StoreError::Rejected(
                    CheckoutRejection::NotAvailable | CheckoutRejection::AlreadyReserved
                ))
            ));
        }

        let analytics = store.analytics().await.unwrap();
        assert_eq!(analytics.total_payments, 1);
        let stored = store.find_property(property.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PropertyStatus::Sold);
    }
}
