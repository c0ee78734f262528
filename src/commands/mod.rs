//! CLI command implementations.

mod tangle;

pub use tangle::{tangle, TangleOptions};
