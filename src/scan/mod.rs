//! Line-oriented rule evaluation against a single report file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::rules::RuleQuery;

/// Outcome of opening a rule's target file.
///
/// Bundles routinely lack files a rule names (a compute node has no
/// pacemaker logs), so absence is an ordinary branch rather than an error.
#[derive(Debug)]
pub enum FileAccess {
    Content(BufReader<File>),
    NotFound,
}

/// Open `path` for streaming. Any failure to open counts as absent.
pub fn open_target(path: &Path) -> FileAccess {
    match File::open(path) {
        Ok(file) => FileAccess::Content(BufReader::new(file)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "target file unavailable");
            FileAccess::NotFound
        }
    }
}

/// Count lines of `reader` matched by `query`.
///
/// Lines are raw bytes, so non-UTF-8 log content is scanned as-is. A line
/// is counted once however many terms hit it. The line terminator (`\n` or
/// `\r\n`) is not part of the matched text, so `$` anchors at the end of
/// the line's content. A read error ends the scan with the lines counted
/// so far.
pub fn count_matching_lines<R: BufRead>(mut reader: R, query: &RuleQuery) -> u64 {
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if query.is_match(line_content(&line)) {
                    count += 1;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "read failed mid-file, keeping partial count");
                break;
            }
        }
    }

    count
}

fn line_content(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Count matching lines in `host_path/rule_subpath/filename`.
///
/// Returns 0 when the file cannot be opened.
pub fn evaluate(host_path: &Path, rule_subpath: &str, filename: &str, query: &RuleQuery) -> u64 {
    let target = host_path.join(rule_subpath).join(filename);

    match open_target(&target) {
        FileAccess::Content(reader) => {
            let count = count_matching_lines(reader, query);
            tracing::debug!(file = %target.display(), matches = count, "scanned");
            count
        }
        FileAccess::NotFound => 0,
    }
}
