//! Recognition of line-level document directives.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ChunkName;

static FILE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@\((?P<name>.*?)@\)\s*=\s*$").unwrap());

static CODE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@<(?P<name>.*?)@>\s*=\s*$").unwrap());

static TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@\s*$").unwrap());

static CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(?P<end>end\s+)?(?P<which>ifweave|iftangle)\s*$").unwrap());

static POST_CREATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@post_create(?:\s+(?P<args>.*))?$").unwrap());

/// What a single input line means to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `@(path@) =`
    FileStart(ChunkName),
    /// `@<name@> =`
    CodeStart(ChunkName),
    /// A line holding only `@`.
    Terminator,
    IfWeave,
    EndIfWeave,
    IfTangle,
    EndIfTangle,
    /// `@post_create ...`, with everything after the keyword.
    PostCreate(&'a str),
    /// Anything else: prose, or chunk content.
    Text,
}

impl<'a> Directive<'a> {
    /// Classifies one line. Directives are only recognized at column 1.
    pub fn parse(line: &'a str) -> Self {
        if !line.starts_with('@') {
            return Self::Text;
        }

        if TERMINATOR.is_match(line) {
            return Self::Terminator;
        }
        if let Some(caps) = FILE_START.captures(line) {
            return Self::FileStart(ChunkName::new(&caps["name"]));
        }
        if let Some(caps) = CODE_START.captures(line) {
            return Self::CodeStart(ChunkName::new(&caps["name"]));
        }
        if let Some(caps) = CONDITIONAL.captures(line) {
            let end = caps.name("end").is_some();
            return match (&caps["which"], end) {
                ("ifweave", false) => Self::IfWeave,
                ("ifweave", true) => Self::EndIfWeave,
                ("iftangle", false) => Self::IfTangle,
                _ => Self::EndIfTangle,
            };
        }
        if let Some(caps) = POST_CREATE.captures(line) {
            return Self::PostCreate(caps.name("args").map_or("", |m| m.as_str()));
        }

        Self::Text
    }
}

/// Splits `@post_create` arguments into the file name and the command text.
///
/// Returns `None` unless both are present.
pub fn split_post_create(args: &str) -> Option<(ChunkName, String)> {
    let (name, command) = args.trim().split_once(char::is_whitespace)?;
    let command = command.trim();
    if command.is_empty() {
        return None;
    }
    Some((ChunkName::new(name), command.to_string()))
}
