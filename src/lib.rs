//! sos-triage: policy-driven scanner for extracted sosreport bundles.
//!
//! Discovers every host bundle of a support case, applies a JSON policy of
//! pattern rules to named files inside each bundle, and reports per-host
//! match counts.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use sostriage::{analyze, AnalyzeOptions};
//! use sostriage::output::{OutputFormat, StreamReporter};
//!
//! let options = AnalyzeOptions {
//!     source_dirs: vec![PathBuf::from("/var/tmp/sosreports")],
//!     rules_path: PathBuf::from("rules.json"),
//!     case_id: "01234567".into(),
//! };
//! let mut reporter = StreamReporter::new(std::io::stdout(), OutputFormat::Console);
//! let summaries = analyze(&options, &mut reporter).unwrap();
//! println!("{} host(s) analyzed", summaries.len());
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod rules;
pub mod scan;

use std::path::PathBuf;

use analysis::AnalysisSummary;
use error::{Result, TriageError};
use output::Reporter;
use report::Locator;

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Directories holding case subdirectories.
    pub source_dirs: Vec<PathBuf>,
    /// JSON rule-definition document.
    pub rules_path: PathBuf,
    /// Case subdirectory to analyze.
    pub case_id: String,
}

/// Run a complete analysis: load policy, locate bundles, tally every rule on
/// every host.
///
/// Policy and discovery failures abort before any host is scanned. A case
/// without bundles is reported as `TriageError::NoReports`.
pub fn analyze(options: &AnalyzeOptions, reporter: &mut dyn Reporter) -> Result<Vec<AnalysisSummary>> {
    match prepare(options) {
        Ok((nodes, policy)) => Ok(analysis::run(&nodes, &policy, reporter)),
        Err(e) => {
            reporter.emit_error(&e);
            Err(e)
        }
    }
}

fn prepare(options: &AnalyzeOptions) -> Result<(report::NodeSet, rules::Policy)> {
    tracing::info!(rules = %options.rules_path.display(), "validating rules");
    let policy = rules::read_policy(&options.rules_path)?;

    let nodes = Locator::new().locate(&options.source_dirs, &options.case_id)?;
    if nodes.is_empty() {
        let dirs: Vec<String> = options
            .source_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        return Err(TriageError::NoReports(dirs.join(", ")));
    }
    tracing::info!(hosts = nodes.len(), case = %options.case_id, "sosreports located");

    Ok((nodes, policy))
}
