//! Line-by-line classification of a document into file and code blocks.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{Result, TangleError, Warning};
use crate::model::{Chunk, ChunkName, ChunkRegistry, Namespace, PostCreationCommand};
use crate::text_location::{TextLocation, STDIN_STREAM};

use super::directive::{split_post_create, Directive};
use super::location_tracker::{LocationTracker, OpenConstructKind};

/// Chunk-gathering state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Gathering {
    Normal,
    File(ChunkName),
    Code(ChunkName),
}

/// Conditional-bracket state, independent of [`Gathering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    None,
    IfWeave,
    IfTangle,
}

impl Bracket {
    fn kind(self) -> Option<OpenConstructKind> {
        match self {
            Bracket::None => None,
            Bracket::IfWeave => Some(OpenConstructKind::IfWeaveBlock),
            Bracket::IfTangle => Some(OpenConstructKind::IfTangleBlock),
        }
    }
}

/// The result of scanning a whole document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Every file and code block, with post-creation commands.
    pub registry: ChunkRegistry,
    /// Non-fatal diagnostics raised during the scan.
    pub warnings: Vec<Warning>,
}

/// State machine driving a single pass over the input lines.
///
/// Lines may come from several streams; state carries over between them.
#[derive(Debug)]
pub struct Classifier {
    gathering: Gathering,
    bracket: Bracket,
    lines: Vec<(String, TextLocation)>,
    tracker: LocationTracker,
    doc: ParsedDocument,
    last_location: Option<TextLocation>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Creates a classifier in the `Normal` state with nothing open.
    pub fn new() -> Self {
        Self {
            gathering: Gathering::Normal,
            bracket: Bracket::None,
            lines: Vec::new(),
            tracker: LocationTracker::new(),
            doc: ParsedDocument::default(),
            last_location: None,
        }
    }

    /// Feeds every line of one input stream.
    pub fn feed_stream(&mut self, input: &str, stream: &str) -> Result<()> {
        let stream: Arc<str> = Arc::from(stream);
        for (index, line) in input.lines().enumerate() {
            self.feed_line(line, TextLocation::new(Arc::clone(&stream), index + 1))?;
        }
        Ok(())
    }

    /// Processes one line.
    pub fn feed_line(&mut self, line: &str, location: TextLocation) -> Result<()> {
        self.last_location = Some(location.clone());

        match Directive::parse(line) {
            Directive::IfWeave => self.open_bracket(Bracket::IfWeave, location),
            Directive::IfTangle => self.open_bracket(Bracket::IfTangle, location),
            Directive::EndIfWeave => self.close_bracket(Bracket::IfWeave, location),
            Directive::EndIfTangle => self.close_bracket(Bracket::IfTangle, location),
            // weave-only content never reaches the tangle output
            _ if self.bracket == Bracket::IfWeave => Ok(()),
            Directive::FileStart(name) => {
                self.start_chunk(OpenConstructKind::FileChunk, name, location)
            }
            Directive::CodeStart(name) => {
                self.start_chunk(OpenConstructKind::CodeChunk, name, location)
            }
            Directive::Terminator => {
                self.terminate(location);
                Ok(())
            }
            Directive::PostCreate(args) => self.post_create(args, location),
            Directive::Text => {
                if self.gathering != Gathering::Normal {
                    self.lines.push((line.to_string(), location));
                }
                Ok(())
            }
        }
    }

    /// Checks that nothing is left open and returns the scanned document.
    pub fn finish(self) -> Result<ParsedDocument> {
        if let Some((kind, opened_at)) = self.tracker.first_open() {
            return Err(TangleError::Unfinished {
                location: self
                    .last_location
                    .clone()
                    .unwrap_or_else(|| opened_at.clone()),
                kind,
                opened_at: opened_at.clone(),
            });
        }
        Ok(self.doc)
    }

    fn open_bracket(&mut self, bracket: Bracket, location: TextLocation) -> Result<()> {
        let Some(new_kind) = bracket.kind() else {
            return Ok(());
        };
        if let Some(open) = self.bracket.kind() {
            let opened_at = self
                .tracker
                .is_open(open)
                .cloned()
                .unwrap_or_else(|| location.clone());
            return Err(TangleError::NestedConditional {
                location,
                kind: new_kind,
                open,
                opened_at,
            });
        }
        self.bracket = bracket;
        self.tracker.mark_open(new_kind, location);
        Ok(())
    }

    fn close_bracket(&mut self, bracket: Bracket, location: TextLocation) -> Result<()> {
        if self.bracket == bracket {
            if let Some(kind) = bracket.kind() {
                self.tracker.clear_open(kind);
            }
            self.bracket = Bracket::None;
        } else if self.bracket != Bracket::IfWeave {
            let which = match bracket {
                Bracket::IfTangle => "@end iftangle",
                _ => "@end ifweave",
            };
            self.warn(location, format!("{} without a matching opening line", which));
        }
        Ok(())
    }

    /// Fails if any chunk or conditional bracket is still open.
    fn checkpoint(&self, location: &TextLocation) -> Result<()> {
        match self.tracker.first_open() {
            Some((kind, opened_at)) => Err(TangleError::Unfinished {
                location: location.clone(),
                kind,
                opened_at: opened_at.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Returns the file or code chunk currently being gathered.
    fn open_chunk(&self) -> Option<(OpenConstructKind, &ChunkName, TextLocation)> {
        let (kind, name) = match &self.gathering {
            Gathering::Normal => return None,
            Gathering::File(name) => (OpenConstructKind::FileChunk, name),
            Gathering::Code(name) => (OpenConstructKind::CodeChunk, name),
        };
        let opened_at = self.tracker.is_open(kind).cloned().unwrap_or_default();
        Some((kind, name, opened_at))
    }

    fn start_chunk(
        &mut self,
        kind: OpenConstructKind,
        name: ChunkName,
        location: TextLocation,
    ) -> Result<()> {
        if let Some((open_kind, open_name, opened_at)) = self.open_chunk() {
            return Err(TangleError::ChunkAlreadyOpen {
                location,
                kind,
                name,
                open_kind,
                open_name: open_name.clone(),
                opened_at,
            });
        }
        self.checkpoint(&location)?;

        self.gathering = match kind {
            OpenConstructKind::FileChunk => Gathering::File(name),
            _ => Gathering::Code(name),
        };
        self.lines.clear();
        self.tracker.mark_open(kind, location);
        Ok(())
    }

    fn terminate(&mut self, location: TextLocation) {
        let (namespace, kind, name) = match std::mem::replace(&mut self.gathering, Gathering::Normal) {
            Gathering::Normal => {
                self.warn(location, "unmatched terminating @-sign");
                return;
            }
            Gathering::File(name) => (Namespace::File, OpenConstructKind::FileChunk, name),
            Gathering::Code(name) => (Namespace::Code, OpenConstructKind::CodeChunk, name),
        };

        let opened_at = self.tracker.clear_open(kind).unwrap_or(location);
        let chunk = Chunk::from_lines(std::mem::take(&mut self.lines), opened_at);
        self.doc.registry.define_or_append(namespace, name, chunk);
    }

    fn post_create(&mut self, args: &str, location: TextLocation) -> Result<()> {
        self.checkpoint(&location)?;

        let (file, command) =
            split_post_create(args).ok_or_else(|| TangleError::MalformedPostCreate {
                location: location.clone(),
            })?;
        tracing::debug!("{}: post-create command for '{}': {}", location, file, command);
        self.doc
            .registry
            .register_post_create(file, PostCreationCommand { command, location });
        Ok(())
    }

    fn warn(&mut self, location: TextLocation, message: impl Into<String>) {
        let warning = Warning::new(location, message);
        tracing::warn!("{}", warning);
        self.doc.warnings.push(warning);
    }
}

/// Scans a single in-memory document.
pub fn parse_document(input: &str, stream: &str) -> Result<ParsedDocument> {
    let mut classifier = Classifier::new();
    classifier.feed_stream(input, stream)?;
    classifier.finish()
}

/// Reads several files as one logical document, in order.
///
/// A path of `-` reads standard input.
pub fn read_documents(paths: &[PathBuf]) -> Result<ParsedDocument> {
    let mut classifier = Classifier::new();
    for path in paths {
        let (content, stream) = read_stream(path)?;
        tracing::debug!("Reading {}", stream);
        classifier.feed_stream(&content, &stream)?;
    }
    classifier.finish()
}

fn read_stream(path: &Path) -> Result<(String, String)> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok((content, STDIN_STREAM.to_string()))
    } else {
        let content = std::fs::read_to_string(path)?;
        Ok((content, path.display().to_string()))
    }
}
