use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".sos-triage.toml";

/// Top-level configuration from `.sos-triage.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
}

/// Where sosreports and rules live when the command line does not say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Directory holding one subdirectory per case.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// JSON rule-definition document.
    #[serde(default = "default_rules")]
    pub rules: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("/var/tmp/sosreports")
}

fn default_rules() -> PathBuf {
    PathBuf::from("rules.json")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            rules: default_rules(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# sos-triage configuration

[files]
# Directory containing one extracted-sosreport directory per case.
source = "/var/tmp/sosreports"

# JSON rule definitions: { "<rule>": { "path": ..., "files": [...], "query": "a, b" } }
rules = "rules.json"
"#
    }
}
