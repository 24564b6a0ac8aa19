pub mod policy;
pub mod query;

use serde::{Deserialize, Serialize};

pub use policy::{read_policy, Policy};
pub use query::RuleQuery;

/// One named policy entry: which files to scan and what counts as a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Directory under the bundle root holding the target files
    /// (e.g. `var/log`).
    pub path: String,
    /// Files inside `path` to scan. May be empty.
    pub files: Vec<String>,
    /// Pattern terms counted per line.
    pub query: RuleQuery,
}
