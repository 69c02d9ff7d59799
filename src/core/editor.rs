//! Interactive editor capability.
//!
//! An [`Editor`] receives a file path, hands the terminal to the user and
//! blocks until they are done. [`ShellEditor`] runs an external command;
//! closures implement the trait too, which keeps tests and alternate UIs
//! free of any process spawning.

use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::OnceLock;

use tracing::{debug, instrument};

/// Environment variable consulted for the default editor
pub const EDITOR_ENV: &str = "EDITOR";

/// Editor used when `EDITOR` is unset or blank
pub const FALLBACK_EDITOR: &str = "vi";

/// Editor failures
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to launch editor `{command}`")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("editor `{command}` exited with {status}")]
    Exit { command: String, status: ExitStatus },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Opens a file for interactive editing and waits until the user is done.
pub trait Editor {
    fn edit(&self, path: &Path) -> Result<(), EditorError>;
}

impl<F> Editor for F
where
    F: Fn(&Path) -> Result<(), EditorError>,
{
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        self(path)
    }
}

/// External editor command plus the parameters placed before the file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellEditor {
    command: String,
    params: Vec<String>,
}

impl ShellEditor {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self { command: command.into(), params }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The editor used when nothing else is configured
    pub fn fallback() -> Self {
        Self::new(FALLBACK_EDITOR, Vec::new())
    }

    /// Tokenize an `EDITOR`-style value.
    ///
    /// Splits on the space character only, then trims each token and drops
    /// empty ones, so runs of spaces collapse but a tab stays inside its
    /// token. Returns `None` when no token survives.
    pub fn parse(value: &str) -> Option<Self> {
        let mut tokens = value
            .split(' ')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        let command = tokens.next()?;
        Some(Self { command, params: tokens.collect() })
    }

    /// Resolve from `EDITOR`, falling back to [`FALLBACK_EDITOR`]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(EDITOR_ENV).ok().as_deref())
    }

    /// Resolution rule behind [`ShellEditor::from_env`], without touching the environment
    pub fn from_env_value(value: Option<&str>) -> Self {
        value
            .and_then(Self::parse)
            .unwrap_or_else(Self::fallback)
    }
}

impl fmt::Display for ShellEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for p in &self.params {
            write!(f, " {p}")?;
        }
        Ok(())
    }
}

impl Editor for ShellEditor {
    #[instrument(level = "debug", skip(self), fields(editor = %self))]
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        // The user drives the editor live, so hand over all three streams
        let status = Command::new(&self.command)
            .args(&self.params)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| EditorError::Launch { command: self.command.clone(), source })?;

        debug!(%status, "editor exited");

        if !status.success() {
            return Err(EditorError::Exit { command: self.command.clone(), status });
        }

        Ok(())
    }
}

/// Process-wide default editor, resolved from `EDITOR` on first use
pub fn default_editor() -> &'static ShellEditor {
    static DEFAULT: OnceLock<ShellEditor> = OnceLock::new();
    DEFAULT.get_or_init(ShellEditor::from_env)
}
