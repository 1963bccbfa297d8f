//! Layer ranks and provenance.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Rank of a configuration layer.
///
/// Ordering follows precedence: the smallest value wins a key collision, so
/// `TestOverride < Runtime < Declared(0) < Declared(1) < ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Overlay filled by `inject_test_config`, outranks everything.
    TestOverride,
    /// Overlay filled by `set`, outranks every declared source.
    Runtime,
    /// Declared source; the index is its declaration position.
    Declared(usize),
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestOverride => f.write_str("test-override"),
            Self::Runtime => f.write_str("runtime"),
            Self::Declared(rank) => write!(f, "declared #{rank}"),
        }
    }
}

/// One configuration layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    /// Free-form label, not required to be unique.
    pub scope: String,
    /// Where the data came from (file path, url, `data`, `env`).
    pub info: String,
    /// Rank fixed at declaration
    pub precedence: Precedence,
    /// `Value::Null` until the source has resolved.
    pub tree: Value,
}

impl ScopeEntry {
    /// Empty slot awaiting its tree.
    pub fn new(scope: impl Into<String>, info: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            scope: scope.into(),
            info: info.into(),
            precedence,
            tree: Value::Null,
        }
    }
}

/// Winning value for a key together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeAndValue {
    /// Merged value at the key
    pub value: Value,
    /// Label of the winning layer
    pub scope: String,
    /// Origin of the winning layer
    pub info: String,
    /// Rank of the winning layer
    pub precedence: Precedence,
}

/// Label used for the test overlay.
pub const TEST_SCOPE: &str = "test";
/// Label used for the runtime `set()` overlay.
pub const RUNTIME_SCOPE: &str = "runtime";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(Precedence::TestOverride < Precedence::Runtime);
        assert!(Precedence::Runtime < Precedence::Declared(0));
        assert!(Precedence::Declared(0) < Precedence::Declared(7));
    }

    #[test]
    fn test_precedence_display() {
        assert_eq!(Precedence::Declared(2).to_string(), "declared #2");
        assert_eq!(Precedence::Runtime.to_string(), "runtime");
    }
}
