use contractguard_core::{ContractAnalysis, CriticalIssue, MediumIssue};
use contractguard_records::SqliteStore;
use tempfile::TempDir;

/// A fresh SQLite store in its own temp directory.
///
/// The directory must outlive the store.
pub async fn setup_store() -> (SqliteStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("records.db"), None)
        .await
        .unwrap();
    (store, dir)
}

#[allow(dead_code)]
pub fn sample_analysis() -> ContractAnalysis {
    ContractAnalysis {
        risk_score: 72,
        critical_issues: vec![CriticalIssue {
            clause: "7.2 Limitation of Liability".to_string(),
            issue: "Liability cap of $5,000,000 exceeds the $2,000,000 limit".to_string(),
            suggestion: "Reduce the cap to $2,000,000".to_string(),
        }],
        medium_issues: vec![MediumIssue {
            clause: "12. Governing Law".to_string(),
            issue: "Counterparty jurisdiction".to_string(),
        }],
        compliant_sections: vec!["Confidentiality".to_string(), "Force Majeure".to_string()],
    }
}
