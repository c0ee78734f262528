//! Chunk registry keyed by namespace and name.

use indexmap::IndexMap;

use super::chunk_name::ChunkName;
use crate::text_location::TextLocation;

/// The two disjoint chunk namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Blocks introduced by `@(path@) =`, named by their output path.
    File,
    /// Blocks introduced by `@<name@> =`, referenced with `@<name@>`.
    Code,
}

/// The accumulated raw text of one named block.
///
/// `origins` holds the source position of every body line, so that
/// expansion errors can point at the line holding a bad reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    body: String,
    origins: Vec<TextLocation>,
}

impl Chunk {
    /// Creates a chunk whose lines start at `first_line` and run consecutively.
    pub fn new(body: impl Into<String>, first_line: TextLocation) -> Self {
        let body = body.into();
        let mut origins = Vec::new();
        let mut location = first_line;
        for _ in body.split('\n') {
            let next = location.next_line();
            origins.push(location);
            location = next;
        }
        Self { body, origins }
    }

    /// Builds a chunk from gathered lines.
    ///
    /// A definition without any lines yields an empty body, attributed to
    /// the directive that opened it.
    pub fn from_lines(lines: Vec<(String, TextLocation)>, opened_at: TextLocation) -> Self {
        if lines.is_empty() {
            return Self {
                body: String::new(),
                origins: vec![opened_at],
            };
        }
        let (texts, origins): (Vec<String>, Vec<TextLocation>) = lines.into_iter().unzip();
        Self {
            body: texts.join("\n"),
            origins,
        }
    }

    /// Returns the raw body, lines joined by `\n` without a trailing newline.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the source position of each body line.
    pub fn origins(&self) -> &[TextLocation] {
        &self.origins
    }

    /// Returns the position of the first body line.
    pub fn location(&self) -> &TextLocation {
        // `origins` always holds at least one entry
        &self.origins[0]
    }

    /// Appends another definition, separated by a single newline.
    pub fn append(&mut self, other: Chunk) {
        self.body.push('\n');
        self.body.push_str(&other.body);
        self.origins.extend(other.origins);
    }
}

/// A shell command to run after a file block has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCreationCommand {
    pub command: String,
    pub location: TextLocation,
}

/// Accumulates every file and code block seen during the scan.
///
/// The registry only grows: repeated definitions are appended in encounter
/// order and nothing is ever removed. Iteration follows first definition.
#[derive(Debug, Clone, Default)]
pub struct ChunkRegistry {
    files: IndexMap<ChunkName, Chunk>,
    code: IndexMap<ChunkName, Chunk>,
    post_create: IndexMap<ChunkName, PostCreationCommand>,
}

impl ChunkRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, namespace: Namespace) -> &IndexMap<ChunkName, Chunk> {
        match namespace {
            Namespace::File => &self.files,
            Namespace::Code => &self.code,
        }
    }

    fn table_mut(&mut self, namespace: Namespace) -> &mut IndexMap<ChunkName, Chunk> {
        match namespace {
            Namespace::File => &mut self.files,
            Namespace::Code => &mut self.code,
        }
    }

    /// Inserts a new block, or appends to an existing block of the same name.
    pub fn define_or_append(&mut self, namespace: Namespace, name: ChunkName, chunk: Chunk) {
        match self.table_mut(namespace).entry(name) {
            indexmap::map::Entry::Occupied(mut entry) => {
                tracing::debug!("Extending {:?} chunk '{}'", namespace, entry.key());
                entry.get_mut().append(chunk);
            }
            indexmap::map::Entry::Vacant(entry) => {
                tracing::debug!("Defining {:?} chunk '{}'", namespace, entry.key());
                entry.insert(chunk);
            }
        }
    }

    /// Returns the body of a block, or `None` if the name is not defined.
    pub fn lookup(&self, namespace: Namespace, name: &ChunkName) -> Option<&str> {
        self.get(namespace, name).map(Chunk::body)
    }

    /// Returns a block with its line origins.
    pub fn get(&self, namespace: Namespace, name: &ChunkName) -> Option<&Chunk> {
        self.table(namespace).get(name)
    }

    /// Checks if a name is defined in the namespace.
    pub fn contains(&self, namespace: Namespace, name: &ChunkName) -> bool {
        self.table(namespace).contains_key(name)
    }

    /// Returns all file blocks in first-definition order.
    pub fn files(&self) -> impl Iterator<Item = (&ChunkName, &Chunk)> {
        self.files.iter()
    }

    /// Returns the number of blocks in a namespace.
    pub fn len(&self, namespace: Namespace) -> usize {
        self.table(namespace).len()
    }

    /// Registers the post-creation command for a file. The last registration wins.
    pub fn register_post_create(&mut self, file: ChunkName, command: PostCreationCommand) {
        if let Some(previous) = self.post_create.insert(file.clone(), command) {
            tracing::debug!(
                "Replacing post-create command for '{}' registered at {}",
                file,
                previous.location
            );
        }
    }

    /// Returns the post-creation command registered for a file.
    pub fn post_create(&self, file: &ChunkName) -> Option<&PostCreationCommand> {
        self.post_create.get(file)
    }

    /// Returns every registered post-creation command.
    pub fn post_create_commands(&self) -> impl Iterator<Item = (&ChunkName, &PostCreationCommand)> {
        self.post_create.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loc(line: usize) -> TextLocation {
        TextLocation::new("doc.w", line)
    }

    #[test]
    fn test_define_and_lookup() {
        let mut registry = ChunkRegistry::new();
        registry.define_or_append(
            Namespace::Code,
            ChunkName::new("greeting"),
            Chunk::new("hello", loc(2)),
        );

        assert_eq!(
            registry.lookup(Namespace::Code, &ChunkName::new("greeting")),
            Some("hello")
        );
        assert_eq!(registry.lookup(Namespace::File, &ChunkName::new("greeting")), None);
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let mut registry = ChunkRegistry::new();
        registry.define_or_append(Namespace::File, ChunkName::new("x"), Chunk::new("file", loc(1)));
        registry.define_or_append(Namespace::Code, ChunkName::new("x"), Chunk::new("code", loc(5)));

        assert_eq!(registry.lookup(Namespace::File, &ChunkName::new("x")), Some("file"));
        assert_eq!(registry.lookup(Namespace::Code, &ChunkName::new("x")), Some("code"));
        assert_eq!(registry.len(Namespace::File), 1);
        assert_eq!(registry.len(Namespace::Code), 1);
    }

    #[test]
    fn test_repeated_definitions_concatenate_in_order() {
        let mut registry = ChunkRegistry::new();
        let name = ChunkName::new("main");
        registry.define_or_append(Namespace::Code, name.clone(), Chunk::new("a\nb", loc(2)));
        registry.define_or_append(Namespace::Code, name.clone(), Chunk::new("c", loc(10)));

        let chunk = registry.get(Namespace::Code, &name).unwrap();
        assert_eq!(chunk.body(), "a\nb\nc");
        assert_eq!(
            chunk.origins().iter().map(|l| l.line).collect::<Vec<_>>(),
            vec![2, 3, 10]
        );
    }

    #[test]
    fn test_empty_definition_is_legal() {
        let chunk = Chunk::from_lines(Vec::new(), loc(4));
        assert_eq!(chunk.body(), "");
        assert_eq!(chunk.location(), &loc(4));
    }

    #[test]
    fn test_from_lines_keeps_whitespace() {
        let chunk = Chunk::from_lines(
            vec![("  indented ".to_string(), loc(3)), ("".to_string(), loc(4))],
            loc(2),
        );
        assert_eq!(chunk.body(), "  indented \n");
        assert_eq!(chunk.origins().len(), 2);
    }

    #[test]
    fn test_files_iterate_in_first_definition_order() {
        let mut registry = ChunkRegistry::new();
        for name in ["b.txt", "a.txt", "b.txt"] {
            registry.define_or_append(Namespace::File, ChunkName::new(name), Chunk::new("x", loc(1)));
        }
        let names: Vec<_> = registry.files().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn test_post_create_last_registration_wins() {
        let mut registry = ChunkRegistry::new();
        let file = ChunkName::new("run.sh");
        registry.register_post_create(
            file.clone(),
            PostCreationCommand {
                command: "chmod 644 run.sh".to_string(),
                location: loc(1),
            },
        );
        registry.register_post_create(
            file.clone(),
            PostCreationCommand {
                command: "chmod +x run.sh".to_string(),
                location: loc(8),
            },
        );

        assert_eq!(registry.post_create(&file).unwrap().command, "chmod +x run.sh");
    }
}
