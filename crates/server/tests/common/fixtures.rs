//! Test fixtures: documents and model completions.

use bytes::Bytes;

/// Plain-text contract used by most tests.
pub fn sample_contract() -> Bytes {
    Bytes::from_static(
        b"MASTER SERVICES AGREEMENT\n\n\
          7.2 Limitation of Liability. Supplier's aggregate liability shall not exceed $5,000,000.\n\
          9.1 Termination. Either party may terminate on 30 days written notice.\n\
          11. Payment. Invoices are payable Net 60.\n",
    )
}

/// Analysis JSON as a model would return it, before any fencing.
pub fn analysis_json() -> &'static str {
    r#"{
  "riskScore": 70,
  "criticalIssues": [
    {
      "clause": "7.2 Limitation of Liability",
      "issue": "Cap of $5,000,000 exceeds the $2,000,000 playbook limit",
      "suggestion": "Reduce the cap to $2,000,000"
    }
  ],
  "mediumIssues": [
    {
      "clause": "11. Payment",
      "issue": "Net 60 is slower than Net 30"
    }
  ],
  "compliantSections": ["9.1 Termination"]
}"#
}

/// `analysis_json` inside a fence tagged `json`.
#[allow(dead_code)]
pub fn fenced_json(inner: &str) -> String {
    format!("```json\n{inner}\n```")
}

/// `analysis_json` inside an untagged fence.
#[allow(dead_code)]
pub fn fenced_plain(inner: &str) -> String {
    format!("```\n{inner}\n```")
}
