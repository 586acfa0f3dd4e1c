//! S3-compatible storage backend.
//!
//! Clients upload straight to the bucket with a presigned `PUT` URL; the
//! analysis pipeline reads the object back with `get`.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectStore, PresignedUpload};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Builder, Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use bytes::Bytes;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

const DEFAULT_REGION: &str = "us-east-1";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`S3Backend`].
#[derive(Clone, Debug, Default)]
pub struct S3Options {
    pub bucket: String,
    /// Custom endpoint (MinIO, LocalStack). A bare `host:port` is taken as http.
    pub endpoint: Option<String>,
    pub region: Option<String>,
    /// Prepended to every object key.
    pub prefix: Option<String>,
    /// Static `(access_key_id, secret_access_key)`. The default provider
    /// chain is used when unset.
    pub credentials: Option<(String, String)>,
    /// Use `endpoint/bucket/key` URLs instead of `bucket.endpoint/key`.
    pub force_path_style: bool,
}

/// S3-compatible object store.
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    pub async fn new(options: S3Options) -> StorageResult<Self> {
        if options.bucket.is_empty() {
            return Err(StorageError::Config("S3 bucket must not be empty".to_string()));
        }

        let region = Region::new(
            options
                .region
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        );

        let mut builder = match options.credentials {
            Some((key_id, secret)) => Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(Credentials::new(
                    key_id,
                    secret,
                    None,
                    None,
                    "contractguard-config",
                )),
            None => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Builder::from(&shared)
            }
        };

        if let Some(endpoint) = options.endpoint {
            builder = builder.endpoint_url(with_scheme(endpoint));
        }
        if options.force_path_style {
            builder = builder.force_path_style(true);
        }

        let prefix = options
            .prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: options.bucket,
            prefix,
        })
    }

    fn object_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }

    /// Map an SDK error, turning a 404 on `key` into `NotFound`.
    fn sdk_error<E>(operation: &'static str, key: &str, err: SdkError<E>) -> StorageError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if let SdkError::ServiceError(service) = &err
            && service.raw().status().as_u16() == 404
        {
            return StorageError::NotFound(key.to_string());
        }
        StorageError::s3(operation, err)
    }
}

fn with_scheme(endpoint: String) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint
    } else {
        format!("http://{endpoint}")
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    #[instrument(skip(self), fields(backend = "s3"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await;

        match head {
            Ok(_) => Ok(true),
            Err(err) => match Self::sdk_error("head_object", key, err) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|e| Self::sdk_error("get_object", key, e))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::s3("get_object", e))?;
        Ok(body.into_bytes())
    }

    #[instrument(skip(self, data), fields(backend = "s3", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .body(data.into())
            .send()
            .await
            .map_err(|e| Self::sdk_error("put_object", key, e))?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(backend = "s3", size = data.len()))]
    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<bool> {
        // Not atomic: two racing writers can both see the key as absent.
        if self.exists(key).await? {
            return Ok(false);
        }
        self.put(key, data).await?;
        Ok(true)
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        // S3 reports success for missing keys.
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|e| Self::sdk_error("delete_object", key, e))?;
        Ok(())
    }

    #[instrument(skip(self, content_type), fields(backend = "s3"))]
    async fn presign_put(
        &self,
        key: &str,
        content_type: Option<&str>,
        ttl: Duration,
    ) -> StorageResult<PresignedUpload> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::Config(format!("invalid upload URL lifetime: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .set_content_type(content_type.map(str::to_string));

        let presigned = request
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::s3("presign put_object", e))?;

        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            expires_at: OffsetDateTime::now_utc() + ttl,
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn health_check(&self) -> StorageResult<()> {
        let head = self.client.head_bucket().bucket(&self.bucket).send();

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, head).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StorageError::s3("head_bucket", e)),
            Err(_) => Err(StorageError::Unavailable(format!(
                "bucket {} did not answer within {}s",
                self.bucket,
                HEALTH_CHECK_TIMEOUT.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(prefix: Option<&str>) -> S3Options {
        S3Options {
            bucket: "contracts-bucket".to_string(),
            endpoint: Some("s3.test".to_string()),
            region: Some("us-east-1".to_string()),
            prefix: prefix.map(str::to_string),
            credentials: Some(("access".to_string(), "secret".to_string())),
            force_path_style: true,
        }
    }

    #[tokio::test]
    async fn test_object_key_applies_trimmed_prefix() {
        let backend = S3Backend::new(options(Some("/uploads/"))).await.unwrap();
        assert_eq!(
            backend.object_key("contracts/abc/msa.txt"),
            "uploads/contracts/abc/msa.txt"
        );

        let backend = S3Backend::new(options(None)).await.unwrap();
        assert_eq!(backend.object_key("contracts/abc/msa.txt"), "contracts/abc/msa.txt");
    }

    #[tokio::test]
    async fn test_empty_bucket_rejected() {
        let err = S3Backend::new(S3Options::default()).await.unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }

    #[test]
    fn test_bare_endpoint_gets_http_scheme() {
        assert_eq!(with_scheme("minio:9000".to_string()), "http://minio:9000");
        assert_eq!(
            with_scheme("HTTPS://s3.example.com".to_string()),
            "HTTPS://s3.example.com"
        );
    }

    #[tokio::test]
    async fn test_presign_put_is_offline_and_bound_to_key() {
        let backend = S3Backend::new(options(None)).await.unwrap();
        let upload = backend
            .presign_put(
                "contracts/abc/msa.txt",
                Some("text/plain"),
                Duration::from_secs(300),
            )
            .await
            .unwrap();

        assert!(
            upload
                .url
                .starts_with("http://s3.test/contracts-bucket/contracts/abc/msa.txt?"),
            "unexpected url: {}",
            upload.url
        );
        assert!(upload.url.contains("X-Amz-Expires=300"));
        assert!(upload.url.contains("X-Amz-Signature="));
        assert!(upload.url.contains("content-type"));
        assert!(upload.expires_at > OffsetDateTime::now_utc());
    }
}
