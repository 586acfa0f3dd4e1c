//! Contract record store for ContractGuard.
//!
//! One record per uploaded document, tracking its analysis lifecycle:
//! `pending_upload -> analyzing -> completed | failed`.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{RecordError, RecordResult};
pub use repos::ContractRepo;
pub use store::{RecordStore, SqliteStore};

use contractguard_core::config::RecordsConfig;
use std::sync::Arc;

/// Create a record store from configuration.
pub async fn from_config(config: &RecordsConfig) -> RecordResult<Arc<dyn RecordStore>> {
    match config {
        RecordsConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn RecordStore>)
        }
    }
}
