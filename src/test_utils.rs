//! Shared test utilities.

use crate::model::{Chunk, ChunkName, ChunkRegistry, Namespace};
use crate::text_location::TextLocation;

/// A block definition for [`registry_with`].
pub struct Def {
    namespace: Namespace,
    name: &'static str,
    body: &'static str,
}

/// A file block definition.
pub fn file(name: &'static str, body: &'static str) -> Def {
    Def {
        namespace: Namespace::File,
        name,
        body,
    }
}

/// A code block definition.
pub fn code(name: &'static str, body: &'static str) -> Def {
    Def {
        namespace: Namespace::Code,
        name,
        body,
    }
}

/// Builds a registry from definitions, each starting on line 1 of `test.w`.
pub fn registry_with(defs: &[Def]) -> ChunkRegistry {
    let mut registry = ChunkRegistry::new();
    for def in defs {
        registry.define_or_append(
            def.namespace,
            ChunkName::new(def.name),
            Chunk::new(def.body, TextLocation::new("test.w", 1)),
        );
    }
    registry
}
