pub mod assets;
pub mod checkout;
pub mod transfer;

pub use assets::{AssetStore, LocalAssetStore};
pub use checkout::{CheckoutError, CheckoutService};
pub use transfer::{provider_from_config, SimulatedTransferProvider, TransferProvider};
