//! Bookkeeping of where open constructs began.

use std::fmt;

use crate::text_location::TextLocation;

/// Constructs that are opened by one line and closed by a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenConstructKind {
    FileChunk,
    CodeChunk,
    IfWeaveBlock,
    IfTangleBlock,
}

impl OpenConstructKind {
    /// All kinds, chunks first.
    pub const ALL: [OpenConstructKind; 4] = [
        OpenConstructKind::FileChunk,
        OpenConstructKind::CodeChunk,
        OpenConstructKind::IfWeaveBlock,
        OpenConstructKind::IfTangleBlock,
    ];

    fn index(self) -> usize {
        match self {
            OpenConstructKind::FileChunk => 0,
            OpenConstructKind::CodeChunk => 1,
            OpenConstructKind::IfWeaveBlock => 2,
            OpenConstructKind::IfTangleBlock => 3,
        }
    }
}

impl fmt::Display for OpenConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OpenConstructKind::FileChunk => "file section",
            OpenConstructKind::CodeChunk => "code section",
            OpenConstructKind::IfWeaveBlock => "@ifweave block",
            OpenConstructKind::IfTangleBlock => "@iftangle block",
        };
        f.write_str(text)
    }
}

/// Records the opening position of every construct that is currently open.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    open: [Option<TextLocation>; 4],
}

impl LocationTracker {
    /// Creates a tracker with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `kind` was opened at `location`.
    pub fn mark_open(&mut self, kind: OpenConstructKind, location: TextLocation) {
        self.open[kind.index()] = Some(location);
    }

    /// Forgets `kind`, returning where it had been opened.
    pub fn clear_open(&mut self, kind: OpenConstructKind) -> Option<TextLocation> {
        self.open[kind.index()].take()
    }

    /// Returns the opening position if `kind` is open.
    pub fn is_open(&self, kind: OpenConstructKind) -> Option<&TextLocation> {
        self.open[kind.index()].as_ref()
    }

    /// Returns the first open construct, chunks before conditional brackets.
    pub fn first_open(&self) -> Option<(OpenConstructKind, &TextLocation)> {
        OpenConstructKind::ALL
            .iter()
            .find_map(|&kind| self.is_open(kind).map(|loc| (kind, loc)))
    }
}
