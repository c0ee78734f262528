//! Readers that turn input documents into a chunk registry.

mod classifier;
mod directive;
mod location_tracker;

pub use classifier::{parse_document, read_documents, Classifier, ParsedDocument};
pub use directive::{split_post_create, Directive};
pub use location_tracker::{LocationTracker, OpenConstructKind};
