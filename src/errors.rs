//! Error types for the tangle engine.

use std::fmt;

use thiserror::Error;

use crate::model::ChunkName;
use crate::readers::OpenConstructKind;
use crate::text_location::TextLocation;

/// Fatal errors. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum TangleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("No input documents found")]
    NoInput,

    #[error("{location}: {kind} cannot be nested inside the {open} opened at {opened_at}")]
    NestedConditional {
        location: TextLocation,
        kind: OpenConstructKind,
        open: OpenConstructKind,
        opened_at: TextLocation,
    },

    #[error(
        "{location}: cannot start {kind} '{name}' while {open_kind} '{open_name}' opened at {opened_at} is unfinished"
    )]
    ChunkAlreadyOpen {
        location: TextLocation,
        kind: OpenConstructKind,
        name: ChunkName,
        open_kind: OpenConstructKind,
        open_name: ChunkName,
        opened_at: TextLocation,
    },

    #[error("{location}: unfinished {kind} started at {opened_at}")]
    Unfinished {
        location: TextLocation,
        kind: OpenConstructKind,
        opened_at: TextLocation,
    },

    #[error("{location}: @post_create needs a file name followed by a command")]
    MalformedPostCreate { location: TextLocation },

    #[error("{location}: chunk @<{name}@> used but not defined (in {context})")]
    UndefinedChunk {
        location: TextLocation,
        name: ChunkName,
        context: String,
    },

    #[error("{location}: chunk @<{name}@> expands itself recursively ({})", display_chain(.chain))]
    RecursiveChunk {
        location: TextLocation,
        name: ChunkName,
        chain: Vec<ChunkName>,
    },

    #[error("{0}")]
    Other(String),
}

fn display_chain(chain: &[ChunkName]) -> String {
    chain
        .iter()
        .map(ChunkName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type alias for tangle operations.
pub type Result<T> = std::result::Result<T, TangleError>;

/// A non-fatal diagnostic. Scanning continues after one is raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub location: TextLocation,
    pub message: String,
}

impl Warning {
    pub fn new(location: TextLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: warning: {}", self.location, self.message)
    }
}
