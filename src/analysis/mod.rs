//! Applies the policy to every discovered host.

pub mod summary;

pub use summary::{AnalysisSummary, RuleTally};

use crate::output::Reporter;
use crate::report::{Host, NodeSet};
use crate::rules::Policy;
use crate::scan;

/// Apply every rule of `policy` to one host.
///
/// Tallies live only for the duration of the call, so hosts never share
/// counts and the function is safe to run per host in parallel.
pub fn summarize_host(host: &Host, policy: &Policy) -> AnalysisSummary {
    tracing::info!(hostname = %host.hostname, "processing node");

    let tallies = policy
        .iter()
        .map(|(name, rule)| {
            let matches: u64 = rule
                .files
                .iter()
                .map(|file| scan::evaluate(&host.path, &rule.path, file, &rule.query))
                .sum();
            tracing::debug!(hostname = %host.hostname, rule = name, matches, "rule tallied");
            RuleTally {
                rule: name.to_string(),
                matches,
            }
        })
        .collect();

    AnalysisSummary {
        hostname: host.hostname.clone(),
        controller: host.controller,
        tallies,
    }
}

/// Summarize each host in discovery order, emitting every summary as soon
/// as it is complete.
pub fn run(nodes: &NodeSet, policy: &Policy, reporter: &mut dyn Reporter) -> Vec<AnalysisSummary> {
    nodes
        .iter()
        .map(|host| {
            let summary = summarize_host(host, policy);
            reporter.emit_summary(&summary);
            summary
        })
        .collect()
}
