//! webtangle - tangle phase of an `@`-directive literate programming tool
//!
//! A web is a plain text document in which code is written as named
//! chunks. File chunks (`@(path@) =`) name an output file; code chunks
//! (`@<name@> =`) are spliced into other chunks wherever `@<name@>` appears.
//! Tangling expands every file chunk and writes the result to disk.
//!
//! # Example
//!
//! ```no_run
//! use webtangle::interface::{tangle_document, Context, Document};
//!
//! let ctx = Context::from_current_dir().unwrap();
//! let doc = Document::load(&ctx.input_files(&[]).unwrap()).unwrap();
//! let transaction = tangle_document(&ctx, &doc).unwrap();
//! transaction.execute().unwrap();
//! ```

pub mod commands;
pub mod config;
pub mod errors;
pub mod interface;
pub mod io;
pub mod model;
pub mod readers;
pub mod text_location;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use errors::{Result, TangleError, Warning};
pub use interface::Context;
pub use model::{ChunkName, ChunkRegistry, Namespace};

pub use commands::TangleOptions;
