//! Application state shared across handlers.

use contractguard_core::Playbook;
use contractguard_core::config::AppConfig;
use contractguard_inference::InferenceClient;
use contractguard_records::RecordStore;
use contractguard_storage::{ObjectStore, UploadSigner};
use std::sync::Arc;

/// Shared application state.
///
/// Every external collaborator is a handle built once at startup and passed in
/// here, so tests can substitute any of them.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage holding uploaded documents.
    pub storage: Arc<dyn ObjectStore>,
    /// Contract record table.
    pub records: Arc<dyn RecordStore>,
    /// Language model used for reviews.
    pub inference: Arc<dyn InferenceClient>,
    /// Rule set documents are reviewed against.
    pub playbook: Arc<Playbook>,
    /// Verifies signed direct uploads. Only set for the filesystem backend.
    pub upload_signer: Option<Arc<UploadSigner>>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        inference: Arc<dyn InferenceClient>,
        playbook: Playbook,
        upload_signer: Option<UploadSigner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            records,
            inference,
            playbook: Arc::new(playbook),
            upload_signer: upload_signer.map(Arc::new),
        }
    }
}
