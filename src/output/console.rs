use crate::analysis::AnalysisSummary;

/// Render summaries as plain text blocks separated by a blank line.
pub fn render(summaries: &[AnalysisSummary]) -> String {
    if summaries.is_empty() {
        return "\n  No hosts analyzed.\n\n".into();
    }

    let mut output = String::new();
    for summary in summaries {
        output.push_str(&summary.to_string());
        output.push('\n');
    }
    output
}
