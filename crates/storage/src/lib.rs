//! Object storage for uploaded contract documents.
//!
//! This crate provides:
//! - The `ObjectStore` abstraction used by the analysis pipeline
//! - Time-limited upload URLs (native S3 presigning, or HMAC-signed URLs
//!   served by this service for the filesystem backend)
//! - Backends: local filesystem and S3-compatible

pub mod backends;
pub mod error;
pub mod signed_url;
pub mod traits;

pub use backends::{
    filesystem::FilesystemBackend,
    s3::{S3Backend, S3Options},
};
pub use error::{StorageError, StorageResult};
pub use signed_url::{UPLOAD_ROUTE_PREFIX, UploadSigner};
pub use traits::{ObjectStore, PresignedUpload};

use contractguard_core::config::StorageConfig;
use std::sync::Arc;

/// Build the upload signer for configurations that need one.
///
/// Only the filesystem backend relies on server-side signed uploads; S3 hands
/// out native presigned URLs and returns `None` here.
pub fn upload_signer(config: &StorageConfig) -> StorageResult<Option<UploadSigner>> {
    match config {
        StorageConfig::Filesystem { signing_secret, .. } => {
            UploadSigner::new(signing_secret).map(Some)
        }
        StorageConfig::S3 { .. } => Ok(None),
    }
}

/// Create an object store from configuration.
///
/// `public_base_url` is where this server is reachable; the filesystem backend
/// mints its upload URLs under it.
pub async fn from_config(
    config: &StorageConfig,
    public_base_url: &str,
) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem {
            path,
            signing_secret,
        } => {
            let signer = UploadSigner::new(signing_secret)?;
            let backend = FilesystemBackend::new(path, signer, public_base_url).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let credentials = access_key_id.clone().zip(secret_access_key.clone());
            let backend = S3Backend::new(S3Options {
                bucket: bucket.clone(),
                endpoint: endpoint.clone(),
                region: region.clone(),
                prefix: prefix.clone(),
                credentials,
                force_path_style: *force_path_style,
            })
            .await?;
            Ok(Arc::new(backend))
        }
    }
}
