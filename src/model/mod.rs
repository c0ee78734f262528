//! Core model types: chunk names, the chunk registry and expansion.

mod chunk_name;
mod expand;
mod registry;

pub use chunk_name::ChunkName;
pub use expand::{expand_chunk, expand_file, ExpansionState, CHUNK_REF};
pub use registry::{Chunk, ChunkRegistry, Namespace, PostCreationCommand};
