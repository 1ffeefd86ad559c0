use std::sync::Arc;

use anyhow::Context;

use crate::auth::federated::{IdentityVerifier, SharedSecretVerifier};
use crate::auth::SessionKeys;
use crate::config::{AppConfig, StoreBackend};
use crate::database::{MemoryStore, PgStore, Store};
use crate::services::{provider_from_config, AssetStore, LocalAssetStore, TransferProvider};

/// Shared handles for every request. Cloning is cheap; nothing here is mutable.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: SessionKeys,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub transfers: Arc<dyn TransferProvider>,
    pub assets: Arc<dyn AssetStore>,
    pub bcrypt_cost: u32,
    pub currency: String,
    pub secure_cookies: bool,
}

impl AppState {
    /// Build every collaborator named by `config`, connecting to Postgres when selected
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match config.database.backend {
            StoreBackend::Postgres => {
                let pg = PgStore::connect(&config.database).await.context("failed to connect to Postgres")?;
                if config.database.run_migrations {
                    pg.migrate().await.context("failed to run migrations")?;
                }
                Arc::new(pg)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_store(config, store)
    }

    /// Build state around an existing store
    pub fn with_store(config: &AppConfig, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let keys = SessionKeys::from_config(&config.security).context("JWT_SECRET must be set")?;
        let verifier = SharedSecretVerifier::new(&config.security.federated_secret)
            .context("FEDERATED_IDENTITY_SECRET must be set")?;
        let transfers = provider_from_config(&config.payments)
            .context("PAYMENT_PROVIDER_URL must be set unless PAYMENT_SIMULATE_TRANSFERS is enabled")?;
        let assets = LocalAssetStore::from_config(&config.uploads, &config.server);

        Ok(Self {
            store,
            keys,
            verifier: Arc::new(verifier),
            transfers: Arc::from(transfers),
            assets: Arc::new(assets),
            bcrypt_cost: config.security.bcrypt_cost,
            currency: config.payments.currency.clone(),
            secure_cookies: config.security.secure_cookies,
        })
    }
}
