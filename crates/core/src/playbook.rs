//! Playbook: the ordered rule set contracts are reviewed against.
//!
//! The rules are data, not code. A deployment can point `playbook.path` at its
//! own TOML document; otherwise the built-in document is used.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

const BUILTIN_PLAYBOOK: &str = include_str!("default_playbook.toml");

/// A single named constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Short upper-case name, e.g. `LIABILITY`.
    pub name: String,
    /// What the contract must satisfy.
    pub constraint: String,
    /// Why the rule exists.
    #[serde(default)]
    pub rationale: String,
}

/// Ordered list of rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    pub rules: Vec<Rule>,
}

impl Playbook {
    /// The built-in company playbook.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PLAYBOOK)
    }

    /// Parse and validate a playbook document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let playbook: Playbook =
            toml::from_str(s).map_err(|e| Error::Playbook(format!("invalid document: {e}")))?;
        playbook.validate()?;
        Ok(playbook)
    }

    /// Load a playbook document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Playbook(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Check the rule set is usable.
    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::Playbook("playbook has no rules".to_string()));
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let name = rule.name.trim();
            if name.is_empty() {
                return Err(Error::Playbook(format!("rules[{index}]: name is empty")));
            }
            if rule.constraint.trim().is_empty() {
                return Err(Error::Playbook(format!(
                    "rules[{index}] ({name}): constraint is empty"
                )));
            }
            if !seen.insert(name.to_ascii_uppercase()) {
                return Err(Error::Playbook(format!("duplicate rule name: {name}")));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render as the numbered list embedded in the review prompt.
    pub fn render(&self) -> String {
        let mut out = String::from("Company Playbook Rules:\n\n");
        for (i, rule) in self.rules.iter().enumerate() {
            let _ = write!(out, "{}. {}: {}", i + 1, rule.name.trim(), rule.constraint.trim());
            let rationale = rule.rationale.trim();
            if !rationale.is_empty() {
                let _ = write!(out, " ({rationale})");
            }
            out.push('\n');
        }
        out
    }
}
