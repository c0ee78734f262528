//! Chunk names.

use std::fmt;

/// Name of a file block (an output path) or a code block.
///
/// Names are taken verbatim from the directive that introduced them;
/// surrounding whitespace is trimmed so `@< main @>` and `@<main@>` agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkName(String);

impl ChunkName {
    /// Creates a new ChunkName, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChunkName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChunkName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ChunkName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
