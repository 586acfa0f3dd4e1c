//! Server test utilities.

use super::inference::ScriptedInference;
use super::records::ObservedRecords;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use contractguard_core::Playbook;
use contractguard_core::config::{AppConfig, RecordsConfig, StorageConfig};
use contractguard_records::SqliteStore;
use contractguard_server::{AppState, create_router};
use contractguard_storage::ObjectStore;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SIGNING_SECRET: &str = "server-test-signing-secret-0123";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub inference: Arc<ScriptedInference>,
    pub records: Arc<ObservedRecords>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage and records.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_path = temp_dir.path().join("storage");
        let db_path = temp_dir.path().join("records.db");

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_path,
            signing_secret: SIGNING_SECRET.to_string(),
        };
        config.records = RecordsConfig::Sqlite {
            path: db_path.clone(),
            query_timeout_secs: None,
        };
        modifier(&mut config);

        let storage: Arc<dyn ObjectStore> =
            contractguard_storage::from_config(&config.storage, &config.server.public_base_url)
                .await
                .expect("Failed to create storage backend");
        let upload_signer = contractguard_storage::upload_signer(&config.storage)
            .expect("Failed to create upload signer");

        let records = Arc::new(ObservedRecords::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create record store"),
        ));
        let inference = Arc::new(ScriptedInference::new());
        let playbook = Playbook::builtin().expect("Built-in playbook is valid");

        contractguard_server::metrics::register_metrics();

        let state = AppState::new(
            config,
            storage,
            records.clone(),
            inference.clone(),
            playbook,
            upload_signer,
        );
        let router = create_router(state.clone());

        Self {
            router,
            state,
            inference,
            records,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a JSON request and decode the JSON response.
    pub async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// POST /upload-url for `file_name`, asserting success.
    pub async fn issue(&self, file_name: &str) -> Value {
        let (status, body) = self
            .json(
                "POST",
                "/upload-url",
                Some(serde_json::json!({ "fileName": file_name, "fileType": "text/plain" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "issue failed: {body}");
        body
    }

    /// PUT `data` to an issued upload URL.
    pub async fn upload(&self, upload_url: &str, data: Bytes) -> StatusCode {
        let path = upload_url
            .strip_prefix(self.state.config.server.public_base_url.as_str())
            .expect("upload URL is minted under the public base URL");
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("Content-Type", "text/plain")
            .body(Body::from(data))
            .unwrap();
        self.send(request).await.status()
    }

    /// POST /analyze for an issued contract.
    pub async fn analyze(&self, issued: &Value) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/analyze",
            Some(serde_json::json!({
                "contractId": issued["contractId"],
                "s3Key": issued["s3Key"],
            })),
        )
        .await
    }

    /// GET /analysis/{id}.
    pub async fn fetch(&self, contract_id: &str) -> (StatusCode, Value) {
        self.json("GET", &format!("/analysis/{contract_id}"), None)
            .await
    }

    /// Issue a URL and upload `data` to it.
    pub async fn issue_and_upload(&self, file_name: &str, data: Bytes) -> Value {
        let issued = self.issue(file_name).await;
        let status = self
            .upload(issued["uploadUrl"].as_str().unwrap(), data)
            .await;
        assert_eq!(status, StatusCode::OK);
        issued
    }
}

/// Decode a response body as JSON, or `Value::Null` when empty or not JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}
