//! Record store trait and SQLite implementation.

use crate::error::{RecordError, RecordResult};
use crate::repos::ContractRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Default advisory query timeout.
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Combined record store trait.
#[async_trait]
pub trait RecordStore: ContractRepo + Send + Sync {
    /// Create tables and indexes if missing.
    async fn migrate(&self) -> RecordResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> RecordResult<()>;
}

/// SQLite-based record store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    query_timeout: Duration,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn new(path: impl AsRef<Path>, query_timeout_secs: Option<u64>) -> RecordResult<Self> {
        let path = path.as_ref();
        let query_timeout =
            Duration::from_secs(query_timeout_secs.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS));

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers and avoids "database is locked".
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            query_timeout,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// SQLite cannot cancel statements, so the timeout only produces a warning.
    fn note_duration(&self, operation: &'static str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.query_timeout {
            tracing::warn!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                timeout_ms = self.query_timeout.as_millis() as u64,
                "record store query exceeded advisory timeout"
            );
        }
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn migrate(&self) -> RecordResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> RecordResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::{ContractRow, encode_analysis};
    use contractguard_core::{ContractAnalysis, ContractId, ContractRecord, ContractStatus};
    use time::OffsetDateTime;

    fn ensure_updated(
        result: sqlx::sqlite::SqliteQueryResult,
        contract_id: ContractId,
    ) -> RecordResult<()> {
        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound(format!(
                "contract {contract_id} not found"
            )));
        }
        Ok(())
    }

    #[async_trait]
    impl ContractRepo for SqliteStore {
        async fn create_contract(&self, record: &ContractRecord) -> RecordResult<()> {
            let started = Instant::now();
            let row = ContractRow::from_record(record)?;
            let result = sqlx::query(
                r#"
                INSERT INTO contracts (
                    contract_id, file_name, s3_key, content_type, status,
                    analysis, error, raw_completion, created_at, updated_at, completed_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.contract_id)
            .bind(&row.file_name)
            .bind(&row.s3_key)
            .bind(&row.content_type)
            .bind(&row.status)
            .bind(&row.analysis)
            .bind(&row.error)
            .bind(&row.raw_completion)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.completed_at)
            .execute(&self.pool)
            .await;
            self.note_duration("create_contract", started);

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                    RecordError::AlreadyExists(format!("contract {}", record.contract_id)),
                ),
                Err(e) => Err(e.into()),
            }
        }

        async fn get_contract(
            &self,
            contract_id: ContractId,
        ) -> RecordResult<Option<ContractRecord>> {
            let started = Instant::now();
            let row =
                sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts WHERE contract_id = ?")
                    .bind(contract_id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await?;
            self.note_duration("get_contract", started);
            row.map(ContractRow::into_record).transpose()
        }

        async fn set_status(
            &self,
            contract_id: ContractId,
            status: ContractStatus,
            updated_at: OffsetDateTime,
        ) -> RecordResult<()> {
            let started = Instant::now();
            let result =
                sqlx::query("UPDATE contracts SET status = ?, updated_at = ? WHERE contract_id = ?")
                    .bind(status.as_str())
                    .bind(updated_at)
                    .bind(contract_id.as_uuid())
                    .execute(&self.pool)
                    .await?;
            self.note_duration("set_status", started);
            ensure_updated(result, contract_id)
        }

        async fn complete_analysis(
            &self,
            contract_id: ContractId,
            analysis: &ContractAnalysis,
            completed_at: OffsetDateTime,
        ) -> RecordResult<()> {
            let started = Instant::now();
            let analysis = encode_analysis(analysis)?;
            let result = sqlx::query(
                r#"
                UPDATE contracts
                SET status = ?, analysis = ?, error = NULL, raw_completion = NULL,
                    completed_at = ?, updated_at = ?
                WHERE contract_id = ?
                "#,
            )
            .bind(ContractStatus::Completed.as_str())
            .bind(analysis)
            .bind(completed_at)
            .bind(completed_at)
            .bind(contract_id.as_uuid())
            .execute(&self.pool)
            .await?;
            self.note_duration("complete_analysis", started);
            ensure_updated(result, contract_id)
        }

        async fn fail_analysis(
            &self,
            contract_id: ContractId,
            error: &str,
            raw_completion: Option<&str>,
            failed_at: OffsetDateTime,
        ) -> RecordResult<()> {
            let started = Instant::now();
            let result = sqlx::query(
                r#"
                UPDATE contracts
                SET status = ?, error = ?, raw_completion = ?, analysis = NULL,
                    completed_at = NULL, updated_at = ?
                WHERE contract_id = ?
                "#,
            )
            .bind(ContractStatus::Failed.as_str())
            .bind(error)
            .bind(raw_completion)
            .bind(failed_at)
            .bind(contract_id.as_uuid())
            .execute(&self.pool)
            .await?;
            self.note_duration("fail_analysis", started);
            ensure_updated(result, contract_id)
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    contract_id BLOB PRIMARY KEY,
    file_name TEXT NOT NULL,
    s3_key TEXT NOT NULL,
    content_type TEXT,
    status TEXT NOT NULL DEFAULT 'pending_upload',
    analysis TEXT,
    error TEXT,
    raw_completion TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    completed_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_contracts_status ON contracts(status);
CREATE INDEX IF NOT EXISTS idx_contracts_created_at ON contracts(created_at);
"#;
