//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Minimum length of the filesystem upload signing secret.
pub const MIN_SIGNING_SECRET_LEN: usize = 16;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Externally reachable base URL of this server. Used to mint upload URLs
    /// for the filesystem storage backend.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Lifetime of issued upload URLs, in seconds.
    #[serde(default = "default_upload_url_ttl_secs")]
    pub upload_url_ttl_secs: u64,
    /// Largest document accepted by the signed upload endpoint.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Value of `Access-Control-Allow-Origin` on every response.
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_upload_url_ttl_secs() -> u64 {
    crate::DEFAULT_UPLOAD_URL_TTL_SECS
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: default_public_base_url(),
            upload_url_ttl_secs: default_upload_url_ttl_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_allow_origin: default_cors_allow_origin(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl ServerConfig {
    /// Upload URL lifetime as a Duration.
    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.upload_url_ttl_secs == 0 {
            return Err("server.upload_url_ttl_secs must be greater than 0".to_string());
        }
        // SigV4 presigned URLs are capped at 7 days.
        if self.upload_url_ttl_secs > 7 * 24 * 3600 {
            return Err(format!(
                "server.upload_url_ttl_secs {} exceeds the 7 day maximum",
                self.upload_url_ttl_secs
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than 0".to_string());
        }
        if self.cors_allow_origin.is_empty()
            || !self.cors_allow_origin.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(format!(
                "server.cors_allow_origin must be a single origin or *, got {:?}",
                self.cors_allow_origin
            ));
        }
        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(format!(
                "server.public_base_url must be an http(s) URL, got {:?}",
                self.public_base_url
            ));
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage. Uploads go through the server's signed
    /// `PUT /v1/objects/{key}` endpoint.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
        /// HMAC secret used to sign upload URLs.
        /// WARNING: Prefer CONTRACTGUARD_STORAGE__SIGNING_SECRET over storing it in config.
        #[serde(default)]
        signing_secret: String,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to the default credential chain if not set.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to the default credential chain if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs. Required for MinIO and some S3-compatible services.
        #[serde(default)]
        force_path_style: bool,
    },
}

/// Filesystem storage under `./data/storage` with no signing secret. The
/// secret must be configured before the section validates.
impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
            signing_secret: String::new(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { signing_secret, .. } => {
                if signing_secret.is_empty() {
                    return Err(
                        "storage.signing_secret is required for filesystem storage \
                         (set CONTRACTGUARD_STORAGE__SIGNING_SECRET)"
                            .to_string(),
                    );
                }
                if signing_secret.len() < MIN_SIGNING_SECRET_LEN {
                    return Err(format!(
                        "storage.signing_secret must be at least {MIN_SIGNING_SECRET_LEN} bytes"
                    ));
                }
                Ok(())
            }
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.is_empty() {
                    return Err("storage.bucket must not be empty".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
        }
    }
}

/// Record store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordsConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        /// Query timeout in seconds (advisory: slow queries are logged, not cancelled).
        #[serde(default = "default_sqlite_query_timeout_secs")]
        query_timeout_secs: Option<u64>,
    },
}

fn default_sqlite_query_timeout_secs() -> Option<u64> {
    Some(30)
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/records.db"),
            query_timeout_secs: default_sqlite_query_timeout_secs(),
        }
    }
}

/// Inference backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InferenceConfig {
    /// Anthropic messages wire format (Anthropic API, Bedrock gateway or proxy).
    Messages {
        /// Full URL the request body is POSTed to.
        endpoint: String,
        /// Sent as `x-api-key` when set.
        api_key: Option<String>,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default = "default_anthropic_version")]
        anthropic_version: String,
        #[serde(default = "default_max_tokens")]
        max_tokens: u32,
        #[serde(default = "default_inference_timeout_secs")]
        timeout_secs: u64,
    },
    /// Any OpenAI-compatible chat completions endpoint.
    OpenAi {
        api_base: String,
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default = "default_max_tokens")]
        max_tokens: u32,
    },
}

fn default_model() -> String {
    "us.anthropic.claude-sonnet-4-5-20250929-v1:0".to_string()
}

fn default_anthropic_version() -> String {
    "bedrock-2023-05-31".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_inference_timeout_secs() -> u64 {
    120
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::Messages {
            endpoint: "http://127.0.0.1:8081/v1/messages".to_string(),
            api_key: None,
            model: default_model(),
            anthropic_version: default_anthropic_version(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_inference_timeout_secs(),
        }
    }
}

impl InferenceConfig {
    pub fn model(&self) -> &str {
        match self {
            Self::Messages { model, .. } | Self::OpenAi { model, .. } => model,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Messages {
                endpoint,
                model,
                max_tokens,
                timeout_secs,
                ..
            } => {
                if endpoint.is_empty() {
                    return Err("inference.endpoint must not be empty".to_string());
                }
                if model.is_empty() {
                    return Err("inference.model must not be empty".to_string());
                }
                if *max_tokens == 0 {
                    return Err("inference.max_tokens must be greater than 0".to_string());
                }
                if *timeout_secs == 0 {
                    return Err("inference.timeout_secs must be greater than 0".to_string());
                }
                Ok(())
            }
            Self::OpenAi {
                api_base,
                model,
                max_tokens,
                ..
            } => {
                if api_base.is_empty() {
                    return Err("inference.api_base must not be empty".to_string());
                }
                if model.is_empty() {
                    return Err("inference.model must not be empty".to_string());
                }
                if *max_tokens == 0 {
                    return Err("inference.max_tokens must be greater than 0".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Playbook source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaybookConfig {
    /// TOML rule document. The built-in playbook is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// What to do with a document longer than `max_document_chars`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Keep the leading `max_document_chars` characters.
    #[default]
    Truncate,
    /// Fail the analysis.
    Reject,
}

/// Analysis pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Character budget for the document in the prompt.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
    #[serde(default)]
    pub oversize_policy: OversizePolicy,
}

fn default_max_document_chars() -> usize {
    crate::DEFAULT_MAX_DOCUMENT_CHARS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_document_chars: default_max_document_chars(),
            oversize_policy: OversizePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_document_chars == 0 {
            return Err("analysis.max_document_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    /// Inference backend (required).
    pub inference: InferenceConfig,
    #[serde(default)]
    pub playbook: PlaybookConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage, SQLite records and a
    /// messages backend on localhost.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Filesystem {
                path: PathBuf::from("./data/storage"),
                signing_secret: "test-only-signing-secret-0123456".to_string(),
            },
            records: RecordsConfig::default(),
            inference: InferenceConfig::default(),
            playbook: PlaybookConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.inference.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}
