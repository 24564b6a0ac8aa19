//! Discovery of sosreport bundles inside a case directory.
//!
//! A case directory holds one extracted bundle per host alongside whatever
//! else the engineer dropped there. A `BundleLayout` decides which
//! subdirectories are real bundles and how to read host metadata out of
//! them; everything else is skipped.

pub mod sos;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Result, TriageError};

/// One validated report bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Hostname recorded inside the bundle. Never the directory name.
    pub hostname: String,
    /// Absolute path to the bundle root.
    pub path: PathBuf,
    /// Whether the host is a cluster control-plane node.
    pub controller: bool,
}

/// Hosts of a case, in discovery order.
pub type NodeSet = Vec<Host>;

/// Recognizes a bundle format and extracts host metadata from it.
pub trait BundleLayout: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Check whether `candidate` carries this layout's marker.
    fn detect(&self, candidate: &Path) -> bool;

    /// Read host metadata from a detected bundle.
    fn load(&self, candidate: &Path) -> Result<Host>;
}

/// Ensure `<root>/<case_id>` exists and is a directory.
pub fn validate_case_dir(root: &Path, case_id: &str) -> Result<PathBuf> {
    let case_dir = root.join(case_id);
    if !case_dir.is_dir() {
        return Err(TriageError::Directory(format!(
            "The selected directory {} doesn't exist",
            case_dir.display()
        )));
    }
    Ok(case_dir)
}

/// Walks case directories and collects the bundles a layout accepts.
pub struct Locator {
    layout: Box<dyn BundleLayout>,
}

impl Locator {
    /// A locator for standard sosreport bundles.
    pub fn new() -> Self {
        Self::with_layout(Box::new(sos::SosLayout))
    }

    pub fn with_layout(layout: Box<dyn BundleLayout>) -> Self {
        Self { layout }
    }

    /// Discover bundles for `case_id` under every root.
    ///
    /// A missing case directory fails the whole call. An empty result is
    /// returned as-is; deciding that "no hosts" is a failure is up to the
    /// caller.
    pub fn locate(&self, roots: &[PathBuf], case_id: &str) -> Result<NodeSet> {
        let mut nodes = Vec::new();

        for root in roots {
            let case_dir = validate_case_dir(root, case_id)?;
            tracing::info!(dir = %case_dir.display(), "validating sosreports");
            self.collect(&case_dir, &mut nodes);
        }

        Ok(nodes)
    }

    fn collect(&self, case_dir: &Path, nodes: &mut NodeSet) {
        let walker = WalkDir::new(case_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable entry in case directory, skipping");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let candidate = entry.path();
            if !self.layout.detect(candidate) {
                tracing::debug!(
                    candidate = %candidate.display(),
                    layout = self.layout.name(),
                    "not a report bundle"
                );
                continue;
            }

            match self.layout.load(candidate) {
                Ok(mut host) => {
                    host.path = std::fs::canonicalize(&host.path).unwrap_or(host.path);
                    tracing::debug!(
                        hostname = %host.hostname,
                        controller = host.controller,
                        "found bundle"
                    );
                    nodes.push(host);
                }
                Err(e) => {
                    tracing::warn!(
                        candidate = %candidate.display(),
                        error = %e,
                        "bundle failed to load, skipping"
                    );
                }
            }
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover standard sosreport bundles for a case.
pub fn locate(roots: &[PathBuf], case_id: &str) -> Result<NodeSet> {
    Locator::new().locate(roots, case_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_bundle(case_dir: &Path, dir: &str, hostname: &str, controller: bool) {
        let root = case_dir.join(dir);
        fs::create_dir_all(root.join("sos_commands")).unwrap();
        fs::write(root.join("hostname"), format!("{hostname}\n")).unwrap();
        if controller {
            fs::create_dir_all(root.join("sos_commands/pacemaker")).unwrap();
        }
    }

    #[test]
    fn missing_case_dir_is_directory_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = locate(&[tmp.path().to_path_buf()], "01234567").unwrap_err();
        assert!(matches!(err, TriageError::Directory(_)));
    }

    #[test]
    fn case_path_that_is_a_file_is_directory_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("01234567"), "").unwrap();
        let err = validate_case_dir(tmp.path(), "01234567").unwrap_err();
        assert!(matches!(err, TriageError::Directory(_)));
    }

    #[test]
    fn empty_case_yields_empty_node_set() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("case")).unwrap();
        let nodes = locate(&[tmp.path().to_path_buf()], "case").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn skips_non_bundles() {
        let tmp = tempfile::tempdir().unwrap();
        let case = tmp.path().join("case");
        fs::create_dir_all(case.join("empty-dir")).unwrap();
        fs::create_dir_all(case.join("no-hostname/sos_commands")).unwrap();
        fs::write(case.join("notes.txt"), "scratch").unwrap();
        make_bundle(&case, "sosreport-ctl0-2024", "overcloud-controller-0", true);

        let nodes = locate(&[tmp.path().to_path_buf()], "case").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].hostname, "overcloud-controller-0");
        assert!(nodes[0].controller);
        assert!(nodes[0].path.is_absolute());
    }

    #[test]
    fn hostname_comes_from_bundle_not_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let case = tmp.path().join("case");
        make_bundle(&case, "sosreport-abc123", "compute-7.example.com", false);

        let nodes = locate(&[tmp.path().to_path_buf()], "case").unwrap();
        assert_eq!(nodes[0].hostname, "compute-7.example.com");
        assert!(!nodes[0].controller);
    }

    #[test]
    fn order_follows_directory_enumeration() {
        let tmp = tempfile::tempdir().unwrap();
        let case = tmp.path().join("case");
        for i in 0..5 {
            make_bundle(&case, &format!("bundle-{i}"), &format!("host-{i}"), false);
        }

        let expected: Vec<String> = fs::read_dir(&case)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().replace("bundle", "host"))
            .collect();
        let nodes = locate(&[tmp.path().to_path_buf()], "case").unwrap();
        let found: Vec<String> = nodes.into_iter().map(|h| h.hostname).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn searches_every_root() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        make_bundle(&a.path().join("case"), "one", "host-a", false);
        make_bundle(&b.path().join("case"), "two", "host-b", true);

        let nodes = locate(&[a.path().to_path_buf(), b.path().to_path_buf()], "case").unwrap();
        let names: Vec<&str> = nodes.iter().map(|h| h.hostname.as_str()).collect();
        assert_eq!(names, vec!["host-a", "host-b"]);
    }

    struct MarkerLayout;

    impl BundleLayout for MarkerLayout {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn detect(&self, candidate: &Path) -> bool {
            candidate.join("MARKER").is_file()
        }

        fn load(&self, candidate: &Path) -> Result<Host> {
            Ok(Host {
                hostname: fs::read_to_string(candidate.join("MARKER"))?.trim().into(),
                path: candidate.to_path_buf(),
                controller: false,
            })
        }
    }

    #[test]
    fn custom_layout_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let case = tmp.path().join("case");
        fs::create_dir_all(case.join("x")).unwrap();
        fs::write(case.join("x/MARKER"), "custom-host").unwrap();
        make_bundle(&case, "real-sos", "ignored", false);

        let nodes = Locator::with_layout(Box::new(MarkerLayout))
            .locate(&[tmp.path().to_path_buf()], "case")
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].hostname, "custom-host");
    }
}
