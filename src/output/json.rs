use crate::analysis::AnalysisSummary;
use crate::error::Result;

use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    hosts: &'a [AnalysisSummary],
    total_matches: u64,
}

/// Render summaries as a JSON report.
pub fn render(summaries: &[AnalysisSummary]) -> Result<String> {
    let report = JsonReport {
        hosts: summaries,
        total_matches: summaries.iter().map(AnalysisSummary::total_matches).sum(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}
