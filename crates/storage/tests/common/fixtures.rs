use bytes::Bytes;
use contractguard_core::config::StorageConfig;
use contractguard_storage::ObjectStore;
use std::path::Path;
use std::sync::Arc;

pub const SIGNING_SECRET: &str = "integration-test-signing-secret";

/// Plain-text contract body used across tests.
pub fn sample_contract() -> Bytes {
    Bytes::from_static(
        b"MASTER SERVICES AGREEMENT\n\n7.2 Liability. Supplier's liability is unlimited.\n",
    )
}

/// Filesystem store rooted in `dir`.
pub async fn store_in(dir: &Path) -> Arc<dyn ObjectStore> {
    let config = StorageConfig::Filesystem {
        path: dir.to_path_buf(),
        signing_secret: SIGNING_SECRET.to_string(),
    };
    contractguard_storage::from_config(&config, "http://127.0.0.1:9999")
        .await
        .unwrap()
}

/// Split a signed upload URL into (key path, expires, signature).
pub fn signed_query(url: &str) -> (String, i64, String) {
    let (path, query) = url.split_once('?').unwrap();
    let key = path
        .split_once(contractguard_storage::UPLOAD_ROUTE_PREFIX)
        .unwrap()
        .1
        .trim_start_matches('/')
        .to_string();
    let mut expires = 0;
    let mut signature = String::new();
    for pair in query.split('&') {
        match pair.split_once('=').unwrap() {
            ("expires", v) => expires = v.parse().unwrap(),
            ("signature", v) => signature = v.to_string(),
            _ => {}
        }
    }
    (key, expires, signature)
}
