//! High-level interface for tangle runs.

mod context;
mod document;

pub use context::Context;
pub use document::{tangle_document, Document};
