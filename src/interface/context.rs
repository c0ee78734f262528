//! Execution context for tangle runs.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::{Result, TangleError};

/// Context for a tangle run: configuration plus the working directory.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration.
    pub config: Config,
    /// Base directory for relative inputs and post-create commands.
    pub base_dir: PathBuf,
}

impl Context {
    /// Creates a new context with the given configuration.
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }

    /// Creates a context with default configuration.
    pub fn default_for_dir(base_dir: PathBuf) -> Self {
        Self::new(Config::default(), base_dir)
    }

    /// Creates a context from the current directory.
    pub fn from_current_dir() -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        let config = crate::config::read_config(&base_dir)?;
        Ok(Self::new(config, base_dir))
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Resolves an output path against the configured output directory.
    pub fn resolve_output(&self, path: &Path) -> PathBuf {
        match self.config.output_dir() {
            Some(dir) if !path.is_absolute() => self.resolve_path(dir).join(path),
            _ => self.resolve_path(path),
        }
    }

    /// Returns input documents matching the configured source patterns.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in self.config.source_patterns() {
            files.extend(self.glob(pattern)?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Determines the input documents, in reading order.
    ///
    /// Explicit paths keep their order; glob patterns among them expand in
    /// sorted order. Without explicit paths the configured patterns are used.
    pub fn input_files(&self, explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let files = if explicit.is_empty() {
            self.source_files()?
        } else {
            let mut files = Vec::new();
            for path in explicit {
                let text = path.to_string_lossy();
                if path == Path::new("-") {
                    files.push(path.clone());
                } else if text.contains(['*', '?', '[']) {
                    let mut matched = self.glob(&text)?;
                    matched.sort();
                    files.extend(matched);
                } else {
                    files.push(self.resolve_path(path));
                }
            }
            files
        };

        if files.is_empty() {
            return Err(TangleError::NoInput);
        }
        Ok(files)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let full = self.resolve_path(Path::new(pattern));
        let mut files = Vec::new();
        for entry in glob::glob(&full.to_string_lossy())? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_path() {
        let dir = tempdir().unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());

        assert_eq!(ctx.resolve_path(Path::new("a.w")), dir.path().join("a.w"));
        assert_eq!(
            ctx.resolve_path(Path::new("/absolute/path")),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_resolve_output_uses_output_dir() {
        let dir = tempdir().unwrap();
        let mut ctx = Context::default_for_dir(dir.path().to_path_buf());
        assert_eq!(ctx.resolve_output(Path::new("x.c")), dir.path().join("x.c"));

        ctx.config.output_dir = Some(PathBuf::from("build"));
        assert_eq!(
            ctx.resolve_output(Path::new("src/x.c")),
            dir.path().join("build/src/x.c")
        );
    }

    #[test]
    fn test_source_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("book.w"), "").unwrap();
        fs::create_dir(dir.path().join("part")).unwrap();
        fs::write(dir.path().join("part/chapter.w"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        let files = ctx.source_files().unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "w"));
    }

    #[test]
    fn test_explicit_inputs_keep_order() {
        let dir = tempdir().unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());

        let files = ctx
            .input_files(&[PathBuf::from("z.w"), PathBuf::from("-"), PathBuf::from("a.w")])
            .unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("z.w"), PathBuf::from("-"), dir.path().join("a.w")]
        );
    }

    #[test]
    fn test_no_input() {
        let dir = tempdir().unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());
        assert!(matches!(ctx.input_files(&[]), Err(TangleError::NoInput)));
    }
}
