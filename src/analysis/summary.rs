use std::fmt;

use serde::{Deserialize, Serialize};

const DIVIDER: &str = "\n--------\n";

/// Total matching lines for one rule on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTally {
    pub rule: String,
    pub matches: u64,
}

/// Per-host result of applying the whole policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub hostname: String,
    pub controller: bool,
    /// One entry per policy rule, in policy order.
    pub tallies: Vec<RuleTally>,
}

impl AnalysisSummary {
    pub fn tally(&self, rule: &str) -> Option<u64> {
        self.tallies
            .iter()
            .find(|t| t.rule == rule)
            .map(|t| t.matches)
    }

    pub fn total_matches(&self) -> u64 {
        self.tallies.iter().map(|t| t.matches).sum()
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary\n{}:{DIVIDER}Controller Node: {}{DIVIDER}",
            self.hostname, self.controller
        )?;
        for tally in &self.tallies {
            writeln!(f, "{}: {}", tally.rule, tally.matches)?;
        }
        Ok(())
    }
}
