//! Structured review result produced by the model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest allowed risk score.
pub const MAX_RISK_SCORE: u8 = 100;

/// Review result the model output is coerced into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAnalysis {
    /// Overall risk, 0-100.
    pub risk_score: u8,
    #[serde(default)]
    pub critical_issues: Vec<CriticalIssue>,
    #[serde(default)]
    pub medium_issues: Vec<MediumIssue>,
    #[serde(default)]
    pub compliant_sections: Vec<String>,
}

impl ContractAnalysis {
    /// Advisory risk band for the score.
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score)
    }
}

/// A clause that violates the playbook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalIssue {
    pub clause: String,
    pub issue: String,
    pub suggestion: String,
}

/// A clause that is concerning but not a hard violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediumIssue {
    pub clause: String,
    pub issue: String,
}

/// Advisory banding of the risk score. Not enforced anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// 0-39 low, 40-69 medium, 70-100 high.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => Self::Low,
            40..=69 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
