use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::config::{ServerConfig, UploadConfig};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Upload is empty")]
    Empty,

    #[error("Upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAsset {
    pub url: String,
    pub file_name: String,
    pub bytes: usize,
    pub content_type: Option<String>,
}

/// Image storage boundary
#[async_trait]
pub trait AssetStore: Send + Sync {
    fn max_bytes(&self) -> usize;
    async fn store(&self, upload: Upload) -> Result<StoredAsset, AssetError>;
}

/// Content-addressed files in a local directory, served back under `public_path`
pub struct LocalAssetStore {
    directory: PathBuf,
    public_url: String,
    max_bytes: usize,
}

impl LocalAssetStore {
    pub fn new(directory: impl Into<PathBuf>, public_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            directory: directory.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn from_config(uploads: &UploadConfig, server: &ServerConfig) -> Self {
        Self::new(
            &uploads.directory,
            format!("{}{}", server.public_base_url, uploads.public_path),
            uploads.max_bytes,
        )
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    fn stored_name(upload: &Upload) -> String {
        let digest = Sha256::digest(&upload.bytes);
        let hash = format!("{:x}", digest);
        match upload.file_name.as_deref().and_then(extension) {
            Some(ext) => format!("{}.{}", &hash[..32], ext),
            None => hash[..32].to_string(),
        }
    }
}

/// Lowercased alphanumeric extension of an uploaded file name
fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    async fn store(&self, upload: Upload) -> Result<StoredAsset, AssetError> {
        if upload.bytes.is_empty() {
            return Err(AssetError::Empty);
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(AssetError::TooLarge { limit: self.max_bytes });
        }

        let file_name = Self::stored_name(&upload);
        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(self.directory.join(&file_name), &upload.bytes).await?;
        info!("Stored upload {} ({} bytes)", file_name, upload.bytes.len());

        Ok(StoredAsset {
            url: format!("{}/{}", self.public_url, file_name),
            file_name,
            bytes: upload.bytes.len(),
            content_type: upload.content_type,
        })
    }
}
