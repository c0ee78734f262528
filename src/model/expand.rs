//! Expansion of `@<name@>` references into fully resolved text.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::chunk_name::ChunkName;
use super::registry::{Chunk, ChunkRegistry, Namespace};
use crate::errors::{Result, TangleError};
use crate::text_location::TextLocation;

/// Matches a chunk reference anywhere on a line.
pub static CHUNK_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"@<.*?@>").unwrap());

/// Chunk names currently being expanded on the active call path.
///
/// One state lives for exactly one top-level expansion request.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    /// Names in the order they were entered (for error reporting).
    stack: Vec<ChunkName>,
    /// Set for O(1) membership checks.
    active: HashSet<ChunkName>,
}

impl ExpansionState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a chunk as being expanded.
    ///
    /// Fails if the chunk is already being expanded further up the path.
    pub fn enter(&mut self, name: &ChunkName, location: &TextLocation) -> Result<()> {
        if self.active.contains(name) {
            let mut chain = self.stack.clone();
            chain.push(name.clone());
            return Err(TangleError::RecursiveChunk {
                location: location.clone(),
                name: name.clone(),
                chain,
            });
        }
        self.active.insert(name.clone());
        self.stack.push(name.clone());
        Ok(())
    }

    /// Clears the marker of one chunk.
    pub fn exit(&mut self, name: &ChunkName) {
        if let Some(pos) = self.stack.iter().rposition(|n| n == name) {
            self.stack.remove(pos);
        }
        self.active.remove(name);
    }

    /// Returns true if the chunk is on the active path.
    pub fn is_active(&self, name: &ChunkName) -> bool {
        self.active.contains(name)
    }
}

/// The block whose text is being expanded, for diagnostics.
struct Scope<'a> {
    namespace: Namespace,
    name: &'a ChunkName,
    location: &'a TextLocation,
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Namespace::File => write!(f, "@({}@)", self.name),
            Namespace::Code => write!(f, "@<{}@>", self.name),
        }
    }
}

struct Expander<'a> {
    registry: &'a ChunkRegistry,
    state: ExpansionState,
}

impl<'a> Expander<'a> {
    fn new(registry: &'a ChunkRegistry) -> Self {
        Self {
            registry,
            state: ExpansionState::new(),
        }
    }

    /// Expands every line of a block body.
    fn expand_text(
        &mut self,
        text: &str,
        origins: Option<&[TextLocation]>,
        scope: &Scope<'_>,
    ) -> Result<String> {
        let mut output = Vec::new();
        for (index, line) in text.split('\n').enumerate() {
            let location = origins
                .and_then(|o| o.get(index))
                .unwrap_or(scope.location);
            output.push(self.expand_line(line, location, scope)?);
        }
        Ok(output.join("\n"))
    }

    /// Expands one source line until no reference tokens remain.
    ///
    /// Every reference is resolved recursively, so after one pass only
    /// tokens synthesized by concatenation on this line can remain. Those
    /// are re-scanned with the names that produced them still active; each
    /// re-scan marks at least one more name, which bounds the loop by the
    /// number of chunks.
    fn expand_line(
        &mut self,
        line: &str,
        location: &TextLocation,
        scope: &Scope<'_>,
    ) -> Result<String> {
        let (mut expanded, mut used) = self.substitute(line, location, scope)?;
        let mut held: Vec<ChunkName> = Vec::new();

        while CHUNK_REF.is_match(&expanded) {
            for name in used.drain(..) {
                if !self.state.is_active(&name) {
                    self.state.enter(&name, location)?;
                    held.push(name);
                }
            }
            tracing::debug!("{}: re-scanning {} for synthesized references", location, scope);

            let mut lines = Vec::new();
            for part in expanded.split('\n') {
                let (text, names) = self.substitute(part, location, scope)?;
                lines.push(text);
                used.extend(names);
            }
            expanded = lines.join("\n");
        }

        for name in &held {
            self.state.exit(name);
        }
        Ok(expanded)
    }

    /// Replaces each reference on a line with its expansion, once. Returns
    /// the text and the names that were substituted.
    fn substitute(
        &mut self,
        line: &str,
        location: &TextLocation,
        scope: &Scope<'_>,
    ) -> Result<(String, Vec<ChunkName>)> {
        let registry = self.registry;
        let mut refs: Vec<(Range<usize>, ChunkName, &Chunk)> = Vec::new();
        for m in CHUNK_REF.find_iter(line) {
            let token = m.as_str();
            let name = ChunkName::new(&token[2..token.len() - 2]);
            let chunk = registry.get(Namespace::Code, &name).ok_or_else(|| {
                TangleError::UndefinedChunk {
                    location: location.clone(),
                    name: name.clone(),
                    context: scope.to_string(),
                }
            })?;
            if self.state.is_active(&name) {
                // produces the recursion error with the full chain
                self.state.enter(&name, location)?;
            }
            refs.push((m.range(), name, chunk));
        }

        if refs.is_empty() {
            return Ok((line.to_string(), Vec::new()));
        }

        let mut result = String::new();
        let mut used = Vec::with_capacity(refs.len());
        let mut cursor = 0;

        for (i, (range, name, chunk)) in refs.into_iter().enumerate() {
            let literal = &line[cursor..range.start];
            let body = self.resolve(&name, chunk, location)?;

            if i == 0 && literal.chars().all(char::is_whitespace) {
                result.push_str(&indent_lines(&body, literal));
            } else {
                result.push_str(literal);
                result.push_str(&body);
            }

            used.push(name);
            cursor = range.end;
        }

        result.push_str(&line[cursor..]);
        Ok((result, used))
    }

    /// Fully expands one code chunk while its name is marked active.
    fn resolve(&mut self, name: &ChunkName, chunk: &Chunk, location: &TextLocation) -> Result<String> {
        self.state.enter(name, location)?;
        let scope = Scope {
            namespace: Namespace::Code,
            name,
            location: chunk.location(),
        };
        let expanded = self.expand_text(chunk.body(), Some(chunk.origins()), &scope)?;
        self.state.exit(name);

        Ok(expanded)
    }
}

/// Prefixes every line of `body` with `indent`.
fn indent_lines(body: &str, indent: &str) -> String {
    if indent.is_empty() {
        return body.to_string();
    }
    let mut out = String::with_capacity(body.len() + indent.len());
    out.push_str(indent);
    out.push_str(&body.replace('\n', &format!("\n{}", indent)));
    out
}

/// Expands the body of a file block.
///
/// The result carries no trailing newline.
pub fn expand_file(registry: &ChunkRegistry, name: &ChunkName) -> Result<String> {
    let chunk = registry
        .get(Namespace::File, name)
        .ok_or_else(|| TangleError::Other(format!("file block @({}@) is not defined", name)))?;

    let scope = Scope {
        namespace: Namespace::File,
        name,
        location: chunk.location(),
    };
    Expander::new(registry).expand_text(chunk.body(), Some(chunk.origins()), &scope)
}

/// Expands a single code chunk as if it were referenced on an empty line.
pub fn expand_chunk(registry: &ChunkRegistry, name: &ChunkName) -> Result<String> {
    let location = TextLocation::default();
    let chunk = registry
        .get(Namespace::Code, name)
        .ok_or_else(|| TangleError::UndefinedChunk {
            location: location.clone(),
            name: name.clone(),
            context: "top-level request".to_string(),
        })?;
    Expander::new(registry).resolve(name, chunk, &location)
}
