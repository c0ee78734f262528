//! Document orchestrator for the tangle run.

use std::path::{Path, PathBuf};

use crate::errors::{Result, Warning};
use crate::io::{expand_tabs, RunCommand, Transaction};
use crate::model::{expand_file, ChunkName, ChunkRegistry, Namespace};
use crate::readers::{parse_document, read_documents, ParsedDocument};

use super::context::Context;

/// One logical document assembled from its input streams.
#[derive(Debug)]
pub struct Document {
    /// Input streams, in reading order.
    pub sources: Vec<PathBuf>,
    /// Parsed document content.
    pub parsed: ParsedDocument,
}

impl Document {
    /// Loads and scans the given files as one document.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let parsed = read_documents(paths)?;
        Ok(Self {
            sources: paths.to_vec(),
            parsed,
        })
    }

    /// Scans an in-memory document.
    pub fn from_text(input: &str, stream: &str) -> Result<Self> {
        Ok(Self {
            sources: vec![PathBuf::from(stream)],
            parsed: parse_document(input, stream)?,
        })
    }

    /// Returns the chunk registry.
    pub fn registry(&self) -> &ChunkRegistry {
        &self.parsed.registry
    }

    /// Returns the warnings raised while scanning.
    pub fn warnings(&self) -> &[Warning] {
        &self.parsed.warnings
    }

    /// Returns the output files named by this document.
    pub fn targets(&self) -> Vec<&ChunkName> {
        self.registry().files().map(|(name, _)| name).collect()
    }
}

/// Expands every file block and queues the writes and post-create commands.
///
/// All file blocks are expanded before anything is queued, so an undefined
/// or recursive reference anywhere leaves the file system untouched.
pub fn tangle_document(ctx: &Context, doc: &Document) -> Result<Transaction> {
    let registry = doc.registry();

    let mut outputs = Vec::with_capacity(registry.len(Namespace::File));
    for (name, _) in registry.files() {
        let mut content = expand_file(registry, name)?;
        content.push('\n');
        if let Some(width) = ctx.config.tab_width {
            content = expand_tabs(&content, width);
        }
        outputs.push((name, content));
    }

    for (name, command) in registry.post_create_commands() {
        if !registry.contains(Namespace::File, name) {
            tracing::warn!(
                "{}: post-create command for {} names no file block",
                command.location,
                name
            );
        }
    }

    let mut transaction = Transaction::new();
    for (name, content) in outputs {
        let path = ctx.resolve_output(Path::new(name.as_str()));
        transaction.write(&path, content, ctx.config.only_if_changed);

        if let Some(command) = registry.post_create(name) {
            if ctx.config.run_post_create {
                transaction.run(RunCommand::new(
                    &path,
                    command.command.clone(),
                    ctx.config.shell.clone(),
                    &ctx.base_dir,
                ));
            } else {
                tracing::debug!("Skipping post-create command for {}", name);
            }
        }
    }

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TangleError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn setup_test_dir() -> (tempfile::TempDir, Context) {
        let dir = tempdir().unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        (dir, ctx)
    }

    fn contents(tx: &Transaction) -> Vec<String> {
        tx.actions()
            .iter()
            .filter_map(|a| a.proposed_content().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_document_load() {
        let (dir, _ctx) = setup_test_dir();
        let first = dir.path().join("a.w");
        let second = dir.path().join("b.w");
        fs::write(&first, "@(out.txt@) =\n@<x@>\n@\n").unwrap();
        fs::write(&second, "@<x@> =\nfrom b\n@\n").unwrap();

        let doc = Document::load(&[first, second]).unwrap();
        assert_eq!(doc.sources.len(), 2);
        assert_eq!(doc.targets(), vec![&ChunkName::new("out.txt")]);
        assert!(doc.warnings().is_empty());
    }

    #[test]
    fn test_tangle_document_appends_newline() {
        let (dir, ctx) = setup_test_dir();
        let doc = Document::from_text(
            "@(out.txt@) =\nhello @<who@>\n@\n@<who@> =\nworld\n@\n",
            "doc.w",
        )
        .unwrap();

        let tx = tangle_document(&ctx, &doc).unwrap();
        assert_eq!(tx.len(), 1);
        assert_eq!(tx.actions()[0].target(), dir.path().join("out.txt"));
        assert_eq!(contents(&tx), vec!["hello world\n"]);
    }

    #[test]
    fn test_tangle_document_expands_tabs() {
        let (_dir, mut ctx) = setup_test_dir();
        ctx.config.tab_width = Some(4);
        let doc = Document::from_text("@(t.txt@) =\n\tx\n@\n", "doc.w").unwrap();

        let tx = tangle_document(&ctx, &doc).unwrap();
        assert_eq!(contents(&tx), vec!["    x\n"]);
    }

    #[test]
    fn test_post_create_follows_its_write() {
        let (dir, ctx) = setup_test_dir();
        let doc = Document::from_text(
            "@post_create run.sh chmod +x run.sh\n@(run.sh@) =\necho hi\n@\n@(other@) =\nx\n@\n",
            "doc.w",
        )
        .unwrap();

        let tx = tangle_document(&ctx, &doc).unwrap();
        let described = tx.describe();
        assert_eq!(described.len(), 3);
        assert_eq!(described[0], format!("write {}", dir.path().join("run.sh").display()));
        assert_eq!(
            described[1],
            format!("run `chmod +x run.sh` after {}", dir.path().join("run.sh").display())
        );
        assert_eq!(described[2], format!("write {}", dir.path().join("other").display()));
    }

    #[test]
    fn test_post_create_disabled() {
        let (_dir, mut ctx) = setup_test_dir();
        ctx.config.run_post_create = false;
        let doc = Document::from_text(
            "@post_create run.sh chmod +x run.sh\n@(run.sh@) =\necho hi\n@\n",
            "doc.w",
        )
        .unwrap();

        assert_eq!(tangle_document(&ctx, &doc).unwrap().len(), 1);
    }

    #[test]
    fn test_undefined_reference_queues_nothing() {
        let (_dir, ctx) = setup_test_dir();
        let doc = Document::from_text(
            "@(good.txt@) =\nfine\n@\n@(bad.txt@) =\n@<missing@>\n@\n",
            "doc.w",
        )
        .unwrap();

        let err = tangle_document(&ctx, &doc).unwrap_err();
        assert!(matches!(err, TangleError::UndefinedChunk { .. }));
    }
}
