//! Ordered file writes and post-creation commands.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::stat::is_unchanged;
use crate::errors::{Result, TangleError};

/// An action that can be executed as part of a transaction.
pub trait Action: std::fmt::Debug + Send + Sync {
    /// Returns the file the action concerns.
    fn target(&self) -> &Path;

    /// Executes the action.
    fn execute(&self) -> Result<()>;

    /// Returns a description of this action.
    fn describe(&self) -> String;

    /// Returns the proposed new content, if any.
    fn proposed_content(&self) -> Option<&str> {
        None
    }
}

/// Write a tangled file, creating parent directories as needed.
#[derive(Debug)]
pub struct WriteFile {
    /// Target file path.
    pub path: PathBuf,
    /// Content to write.
    pub content: String,
    /// Skip the write when the file already holds `content`.
    pub only_if_changed: bool,
}

impl WriteFile {
    /// Creates a new write action.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            only_if_changed: false,
        }
    }

    /// Enables the unchanged-content check.
    pub fn only_if_changed(mut self, enabled: bool) -> Self {
        self.only_if_changed = enabled;
        self
    }
}

impl Action for WriteFile {
    fn target(&self) -> &Path {
        &self.path
    }

    fn execute(&self) -> Result<()> {
        if self.only_if_changed && is_unchanged(&self.path, &self.content)? {
            tracing::debug!("{} is unchanged, leaving it alone", self.path.display());
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        atomic_write(&self.path, &self.content)?;
        tracing::info!("Wrote {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("write {}", self.path.display())
    }

    fn proposed_content(&self) -> Option<&str> {
        Some(&self.content)
    }
}

/// Run a shell command after its file has been written.
#[derive(Debug)]
pub struct RunCommand {
    /// The file whose post-creation command this is.
    pub target: PathBuf,
    /// Command text handed to the shell.
    pub command: String,
    /// Program and leading arguments, e.g. `["sh", "-c"]`.
    pub shell: Vec<String>,
    /// Working directory for the command.
    pub cwd: PathBuf,
}

impl RunCommand {
    /// Creates a new command action.
    pub fn new(
        target: impl Into<PathBuf>,
        command: impl Into<String>,
        shell: Vec<String>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target: target.into(),
            command: command.into(),
            shell,
            cwd: cwd.into(),
        }
    }
}

impl Action for RunCommand {
    fn target(&self) -> &Path {
        &self.target
    }

    fn execute(&self) -> Result<()> {
        let (program, args) = self
            .shell
            .split_first()
            .ok_or_else(|| TangleError::Config("`shell` must name a program".to_string()))?;

        tracing::info!("Running `{}`", self.command);
        let status = Command::new(program)
            .args(args)
            .arg(&self.command)
            .current_dir(&self.cwd)
            .status()?;

        if !status.success() {
            tracing::warn!(
                "post-create command for {} exited with {}: {}",
                self.target.display(),
                status,
                self.command
            );
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("run `{}` after {}", self.command, self.target.display())
    }
}

/// An ordered list of actions.
///
/// Building a transaction touches nothing; all effects happen in [`Transaction::execute`].
#[derive(Debug, Default)]
pub struct Transaction {
    actions: Vec<Box<dyn Action>>,
}

impl Transaction {
    /// Creates a new empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Adds an action to the transaction.
    pub fn add(&mut self, action: impl Action + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Adds a write action.
    pub fn write(&mut self, path: impl Into<PathBuf>, content: impl Into<String>, only_if_changed: bool) {
        self.add(WriteFile::new(path, content).only_if_changed(only_if_changed));
    }

    /// Adds a post-creation command.
    pub fn run(&mut self, action: RunCommand) {
        self.add(action);
    }

    /// Returns the number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if there are no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the actions in execution order.
    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    /// Returns descriptions of all actions.
    pub fn describe(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.describe()).collect()
    }

    /// Executes all actions in order, stopping at the first failure.
    pub fn execute(&self) -> Result<()> {
        for action in &self.actions {
            action.execute()?;
        }
        Ok(())
    }
}

/// Counter for unique temp file names.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes content to a file atomically using a temp file.
fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_path = parent.join(format!(
        ".webtangle-tmp-{}-{}",
        std::process::id(),
        counter,
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("src/deep/out.c");

        WriteFile::new(&path, "int x;\n").execute().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "int x;\n");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old\n").unwrap();

        WriteFile::new(&path, "new\n").execute().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_only_if_changed_leaves_identical_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "same\n").unwrap();
        // a rename would replace the inode and reset the mode
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        WriteFile::new(&path, "same\n")
            .only_if_changed(true)
            .execute()
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_in_cwd() {
        let dir = tempdir().unwrap();
        let action = RunCommand::new(
            dir.path().join("out.sh"),
            "echo ran > marker",
            vec!["sh".to_string(), "-c".to_string()],
            dir.path(),
        );

        action.execute().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("marker")).unwrap(), "ran\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_is_not_fatal() {
        let dir = tempdir().unwrap();
        let action = RunCommand::new("x", "exit 3", vec!["sh".to_string(), "-c".to_string()], dir.path());
        assert!(action.execute().is_ok());
    }

    #[test]
    fn test_missing_shell_is_an_error() {
        let action = RunCommand::new("x", "true", Vec::new(), ".");
        assert!(matches!(action.execute(), Err(TangleError::Config(_))));
    }

    #[test]
    fn test_transaction_runs_in_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let mut tx = Transaction::new();
        tx.write(&a, "a\n", false);
        tx.write(&b, "b\n", false);

        assert_eq!(tx.len(), 2);
        assert_eq!(
            tx.describe(),
            vec![
                format!("write {}", a.display()),
                format!("write {}", b.display())
            ]
        );

        tx.execute().unwrap();
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn test_empty_transaction() {
        let tx = Transaction::new();
        assert!(tx.is_empty());
        assert!(tx.execute().is_ok());
    }
}
