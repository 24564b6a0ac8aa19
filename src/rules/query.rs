use std::fmt;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Separator between terms in the serialized query string.
pub const TERM_DELIMITER: &str = ", ";

/// A parsed pattern-term list.
///
/// Rules store their query as `"term1, term2, ..."`. Each term is a literal
/// substring or a regex fragment; the query matches a line when any term
/// matches anywhere in it. Whitespace around a term is dropped, as are empty
/// terms, so the normalized string is what serializes back. Terms are
/// validated one by one when the query is parsed so a bad term is reported
/// against the rule that owns it, before any report file is opened.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleQuery {
    terms: Vec<String>,
    pattern: Regex,
}

impl RuleQuery {
    pub fn parse(raw: &str) -> Result<Self> {
        let terms: Vec<String> = raw
            .split(TERM_DELIMITER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        if terms.is_empty() {
            return Err(TriageError::Config(format!(
                "query '{raw}' contains no pattern terms"
            )));
        }

        for term in &terms {
            Regex::new(term).map_err(|e| {
                TriageError::Config(format!("invalid pattern term '{term}': {e}"))
            })?;
        }

        // Group each term so inline flags like `(?i)` stay inside it.
        let alternation = terms
            .iter()
            .map(|t| format!("(?:{t})"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).map_err(|e| {
            TriageError::Config(format!("invalid query '{alternation}': {e}"))
        })?;

        Ok(Self { terms, pattern })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The alternation actually applied to each line.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// True when any term matches somewhere in `line`.
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.pattern.is_match(line)
    }
}

impl PartialEq for RuleQuery {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl Eq for RuleQuery {}

impl fmt::Debug for RuleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleQuery")
            .field("terms", &self.terms)
            .finish()
    }
}

impl fmt::Display for RuleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms.join(TERM_DELIMITER))
    }
}

impl TryFrom<String> for RuleQuery {
    type Error = String;

    fn try_from(raw: String) -> std::result::Result<Self, String> {
        Self::parse(&raw).map_err(|e| match e {
            TriageError::Config(msg) => msg,
            other => other.to_string(),
        })
    }
}

impl From<RuleQuery> for String {
    fn from(query: RuleQuery) -> Self {
        query.to_string()
    }
}
