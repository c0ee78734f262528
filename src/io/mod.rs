//! Output emission: file writes, post-creation commands, and helpers.

mod stat;
mod tabs;
mod transaction;

pub use stat::{hexdigest_file, hexdigest_str, is_unchanged};
pub use tabs::expand_tabs;
pub use transaction::{Action, RunCommand, Transaction, WriteFile};
