use std::path::Path;

use super::{BundleLayout, Host};
use crate::error::{Result, TriageError};

/// Directory every sosreport writes its command captures into.
const COMMANDS_DIR: &str = "sos_commands";

/// Plain-text hostname capture at the bundle root.
const HOSTNAME_FILE: &str = "hostname";

/// Paths whose presence marks a cluster control-plane node.
const CONTROLLER_MARKERS: &[&str] = &[
    "sos_commands/pacemaker",
    "etc/corosync/corosync.conf",
    "var/lib/config-data/puppet-generated/haproxy",
];

/// Standard sosreport bundle layout.
///
/// A bundle is recognized by its `sos_commands/` directory together with
/// the `hostname` capture at the root.
pub struct SosLayout;

impl BundleLayout for SosLayout {
    fn name(&self) -> &'static str {
        "sosreport"
    }

    fn detect(&self, candidate: &Path) -> bool {
        candidate.join(COMMANDS_DIR).is_dir() && candidate.join(HOSTNAME_FILE).is_file()
    }

    fn load(&self, candidate: &Path) -> Result<Host> {
        let content = std::fs::read_to_string(candidate.join(HOSTNAME_FILE))?;
        let hostname = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| TriageError::Bundle {
                path: candidate.display().to_string(),
                message: "hostname file is empty".into(),
            })?;

        Ok(Host {
            hostname: hostname.to_string(),
            path: candidate.to_path_buf(),
            controller: is_controller(candidate),
        })
    }
}

fn is_controller(root: &Path) -> bool {
    CONTROLLER_MARKERS.iter().any(|m| root.join(m).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sos_commands")).unwrap();
        fs::write(dir.path().join("hostname"), "\n  compute-0.localdomain \n").unwrap();
        dir
    }

    #[test]
    fn detects_marker() {
        let dir = bundle();
        assert!(SosLayout.detect(dir.path()));
    }

    #[test]
    fn hostname_file_alone_is_not_a_bundle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hostname"), "h").unwrap();
        assert!(!SosLayout.detect(dir.path()));
    }

    #[test]
    fn reads_first_non_empty_hostname_line() {
        let dir = bundle();
        let host = SosLayout.load(dir.path()).unwrap();
        assert_eq!(host.hostname, "compute-0.localdomain");
        assert!(!host.controller);
    }

    #[test]
    fn empty_hostname_is_rejected() {
        let dir = bundle();
        fs::write(dir.path().join("hostname"), "  \n").unwrap();
        assert!(matches!(
            SosLayout.load(dir.path()),
            Err(TriageError::Bundle { .. })
        ));
    }

    #[test]
    fn pacemaker_marks_controller() {
        let dir = bundle();
        fs::create_dir_all(dir.path().join("sos_commands/pacemaker")).unwrap();
        assert!(SosLayout.load(dir.path()).unwrap().controller);
    }

    #[test]
    fn corosync_config_marks_controller() {
        let dir = bundle();
        fs::create_dir_all(dir.path().join("etc/corosync")).unwrap();
        fs::write(dir.path().join("etc/corosync/corosync.conf"), "totem {}").unwrap();
        assert!(SosLayout.load(dir.path()).unwrap().controller);
    }
}
