use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PaymentConfig;

/// Funds movement from payer to property owner
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    /// Our payment id, sent as the idempotency reference
    pub reference: Uuid,
    pub amount: Decimal,
    pub currency: String,
    /// Property owner receiving the funds
    pub destination: Uuid,
    pub payer: Uuid,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub provider_reference: String,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Transfer declined: {0}")]
    Declined(String),

    #[error("Unexpected provider response: {0}")]
    Protocol(String),

    #[error("No transfer provider configured and simulation is disabled")]
    NotConfigured,

    #[error("Transfer outcome unknown: {0}")]
    Unconfirmed(String),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl TransferError {
    /// True when funds certainly did not move. Any other error leaves the
    /// outcome unknown: the request may have reached the provider.
    pub fn is_definite(&self) -> bool {
        match self {
            TransferError::Unconfirmed(_) => false,
            TransferError::Http(e) => e.is_connect() || e.is_builder(),
            TransferError::Declined(_)
            | TransferError::Protocol(_)
            | TransferError::NotConfigured
            | TransferError::InvalidUrl(_) => true,
        }
    }
}

/// External service that moves funds
#[async_trait]
pub trait TransferProvider: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProviderStatus {
    Completed,
    Declined,
    Failed,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: ProviderStatus,
    #[serde(default)]
    transfer_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Provider reached over HTTP: `POST {base}/transfers` with a JSON body
pub struct HttpTransferProvider {
    client: Client,
    endpoint: url::Url,
    api_key: Option<String>,
}

impl HttpTransferProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, TransferError> {
        let mut base = url::Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base.join("transfers")?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint, api_key })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl TransferProvider for HttpTransferProvider {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        let mut call = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Protocol(format!("provider answered {}", status)));
        }

        let body: ProviderResponse = response.json().await?;
        debug!("Provider response for {}: {:?}", request.reference, body);
        match body.status {
            ProviderStatus::Completed => {
                let provider_reference = body
                    .transfer_id
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| TransferError::Unconfirmed("completed transfer without id".to_string()))?;
                Ok(TransferReceipt { provider_reference })
            }
            ProviderStatus::Declined | ProviderStatus::Failed => Err(TransferError::Declined(
                body.reason.unwrap_or_else(|| "no reason given".to_string()),
            )),
        }
    }
}

/// Completes every transfer locally. Used when no provider is configured.
#[derive(Debug, Default)]
pub struct SimulatedTransferProvider;

#[async_trait]
impl TransferProvider for SimulatedTransferProvider {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        info!(
            "Simulated transfer of {} {} from {} to {}",
            request.amount, request.currency, request.payer, request.destination
        );
        Ok(TransferReceipt { provider_reference: format!("sim_{}", request.reference.simple()) })
    }
}

/// Pick the provider named by configuration
pub fn provider_from_config(config: &PaymentConfig) -> Result<Box<dyn TransferProvider>, TransferError> {
    match &config.provider_url {
        Some(url) => {
            let provider = HttpTransferProvider::new(
                url,
                config.provider_api_key.clone(),
                Duration::from_secs(config.provider_timeout_secs),
            )?;
            info!("Using transfer provider at {}", provider.endpoint());
            Ok(Box::new(provider))
        }
        None if config.simulate_transfers => {
            info!("No transfer provider configured; transfers are simulated");
            Ok(Box::new(SimulatedTransferProvider))
        }
        None => Err(TransferError::NotConfigured),
    }
}
