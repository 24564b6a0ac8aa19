use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Rule;
use crate::error::{Result, TriageError};

/// The rule set applied to every host, keyed by rule name.
///
/// Loaded once per run and shared read-only. Iteration is ordered by rule
/// name so repeated runs produce identical summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy {
    rules: BTreeMap<String, Rule>,
}

impl Policy {
    pub fn new(rules: BTreeMap<String, Rule>) -> Self {
        Self { rules }
    }

    /// Parse a rule-definition document.
    ///
    /// Any missing field or bad query term fails the whole document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| TriageError::Config(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Load the policy from a JSON rules file.
pub fn read_policy(path: &Path) -> Result<Policy> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TriageError::Config(format!("cannot read rules file {}: {e}", path.display()))
    })?;
    let policy = Policy::from_json_str(&content).map_err(|e| match e {
        TriageError::Config(msg) => TriageError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    tracing::debug!(rules = policy.len(), path = %path.display(), "policy loaded");
    Ok(policy)
}
