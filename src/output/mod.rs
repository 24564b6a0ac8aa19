pub mod console;
pub mod json;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisSummary;
use crate::error::{Result, TriageError};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a whole run's summaries into the specified format.
pub fn render(summaries: &[AnalysisSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(summaries)),
        OutputFormat::Json => json::render(summaries),
    }
}

/// Receives results as the analysis produces them.
pub trait Reporter {
    /// Called once per host, after all its rules are tallied.
    fn emit_summary(&mut self, summary: &AnalysisSummary);

    /// Called for failures the user must see.
    fn emit_error(&mut self, error: &TriageError);
}

/// Writes each summary to a stream as soon as it arrives.
///
/// Summaries always reach the writer regardless of the log filter; they are
/// also recorded in the log.
pub struct StreamReporter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> StreamReporter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for StreamReporter<W> {
    fn emit_summary(&mut self, summary: &AnalysisSummary) {
        tracing::info!("{summary}");

        let written = match self.format {
            OutputFormat::Console => writeln!(self.writer, "{summary}"),
            OutputFormat::Json => match serde_json::to_string(summary) {
                Ok(line) => writeln!(self.writer, "{line}"),
                Err(e) => {
                    tracing::error!(error = %e, hostname = %summary.hostname, "cannot encode summary");
                    return;
                }
            },
        };
        if let Err(e) = written.and_then(|_| self.writer.flush()) {
            tracing::error!(error = %e, "cannot write summary");
        }
    }

    fn emit_error(&mut self, error: &TriageError) {
        tracing::error!("{error}");
    }
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub summaries: Vec<AnalysisSummary>,
    pub errors: Vec<String>,
}

impl Reporter for CollectingReporter {
    fn emit_summary(&mut self, summary: &AnalysisSummary) {
        self.summaries.push(summary.clone());
    }

    fn emit_error(&mut self, error: &TriageError) {
        self.errors.push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RuleTally;

    fn summary() -> AnalysisSummary {
        AnalysisSummary {
            hostname: "compute-1".into(),
            controller: false,
            tallies: vec![RuleTally {
                rule: "errors".into(),
                matches: 3,
            }],
        }
    }

    #[test]
    fn lenient_format_names() {
        assert_eq!(OutputFormat::from_str_lenient("TEXT"), Some(OutputFormat::Console));
        assert_eq!(OutputFormat::from_str_lenient("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str_lenient("sarif"), None);
    }

    #[test]
    fn stream_reporter_writes_console_block() {
        let mut reporter = StreamReporter::new(Vec::new(), OutputFormat::Console);
        reporter.emit_summary(&summary());
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.starts_with("Summary\ncompute-1:\n"));
        assert!(out.contains("errors: 3\n"));
    }

    #[test]
    fn stream_reporter_writes_json_lines() {
        let mut reporter = StreamReporter::new(Vec::new(), OutputFormat::Json);
        reporter.emit_summary(&summary());
        reporter.emit_summary(&summary());
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: AnalysisSummary = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, summary());
    }

    #[test]
    fn collecting_reporter_keeps_errors() {
        let mut reporter = CollectingReporter::default();
        reporter.emit_error(&TriageError::NoReports("/srv".into()));
        assert_eq!(reporter.errors.len(), 1);
    }
}
