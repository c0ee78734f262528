//! Source positions for diagnostics.

use std::fmt;
use std::sync::Arc;

/// Stream identifier used for lines read from standard input.
pub const STDIN_STREAM: &str = "<stdin>";

/// A line within one of the input streams.
///
/// Every construct that can be left open (chunks, conditional brackets)
/// carries the location it was opened at, so fatal errors can cite it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    /// Name of the input stream (usually a file path).
    pub stream: Arc<str>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl TextLocation {
    /// Creates a new TextLocation.
    pub fn new(stream: impl Into<Arc<str>>, line: usize) -> Self {
        Self {
            stream: stream.into(),
            line,
        }
    }

    /// Creates a location without a meaningful stream name.
    pub fn line_only(line: usize) -> Self {
        Self::new("<input>", line)
    }

    /// Returns the location of the following line in the same stream.
    pub fn next_line(&self) -> Self {
        Self {
            stream: Arc::clone(&self.stream),
            line: self.line + 1,
        }
    }
}

impl Default for TextLocation {
    fn default() -> Self {
        Self::line_only(1)
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stream, self.line)
    }
}
