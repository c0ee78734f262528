//! Configuration data structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns for input documents, used when none are given explicitly.
    #[serde(default = "default_source_patterns")]
    pub source_patterns: Vec<String>,

    /// Directory relative output paths are resolved against.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Expand tabs in emitted files to this tab stop width.
    #[serde(default)]
    pub tab_width: Option<usize>,

    /// Leave files whose contents would not change untouched.
    #[serde(default)]
    pub only_if_changed: bool,

    /// Run `@post_create` commands after writing their file.
    #[serde(default = "default_run_post_create")]
    pub run_post_create: bool,

    /// Program and leading arguments used to run post-create commands.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
}

fn default_source_patterns() -> Vec<String> {
    vec!["**/*.w".to_string()]
}

fn default_run_post_create() -> bool {
    true
}

fn default_shell() -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_patterns: default_source_patterns(),
            output_dir: None,
            tab_width: None,
            only_if_changed: false,
            run_post_create: default_run_post_create(),
            shell: default_shell(),
        }
    }
}

impl Config {
    /// Returns all source patterns.
    pub fn source_patterns(&self) -> &[String] {
        &self.source_patterns
    }

    /// Returns the output directory, if configured.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> crate::errors::Result<()> {
        if self.shell.is_empty() {
            return Err(crate::errors::TangleError::Config(
                "`shell` must name a program".to_string(),
            ));
        }
        if self.tab_width == Some(0) {
            return Err(crate::errors::TangleError::Config(
                "`tab_width` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
