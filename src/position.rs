//! Source positions carried by every instruction, for warnings.

use std::fmt;

/// A location in the original C source, as produced by the (external) parser.
///
/// The simplifier never inspects these beyond forwarding them to diagnostics;
/// they are opaque payload as far as the rewrite rules are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
