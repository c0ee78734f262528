//! Tangle command implementation.

use std::path::PathBuf;

use crate::errors::Result;
use crate::interface::{tangle_document, Context, Document};

/// Options for the tangle command.
#[derive(Debug, Clone, Default)]
pub struct TangleOptions {
    /// Dry run - show what would be done without doing it.
    pub dry_run: bool,
    /// Input documents, read in order (empty means the configured patterns).
    pub files: Vec<PathBuf>,
}

/// Executes the tangle command.
pub fn tangle(ctx: &Context, options: TangleOptions) -> Result<()> {
    tracing::info!("Tangling documents...");

    let inputs = ctx.input_files(&options.files)?;
    let doc = Document::load(&inputs)?;
    let transaction = tangle_document(ctx, &doc)?;

    if transaction.is_empty() {
        println!("No files to tangle.");
        return Ok(());
    }

    if options.dry_run {
        println!("Would perform {} actions:", transaction.len());
        for desc in transaction.describe() {
            println!("  {}", desc);
        }
        return Ok(());
    }

    transaction.execute()?;

    println!("Tangled {} files.", doc.targets().len());

    Ok(())
}
