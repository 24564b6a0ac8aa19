use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Bundle error ({path}): {message}")]
    Bundle { path: String, message: String },

    #[error("A case number must be used if running from a container")]
    CaseRequired,

    #[error("No sosreports found, please review the directory {0}")]
    NoReports(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TriageError {
    /// Process exit status for this failure.
    ///
    /// Missing directories and empty cases are user-facing outcomes (1);
    /// everything else is a hard failure (2).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Directory(_) | Self::NoReports(_) | Self::CaseRequired => 1,
            _ => 2,
        }
    }
}
