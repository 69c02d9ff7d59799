//! visudo-like edit prompt.
//!
//! 1. Copy the file to a temporary location.
//! 2. Open the copy in the editor and wait for it to exit.
//! 3. If nothing changed, return the contents untouched.
//! 4. Otherwise validate the new bytes with the caller's rule.
//! 5. Overwrite the original only when validation passes, keeping its mode.
//!
//! The original is written iff the editor produced different bytes and the
//! rule accepted them. Any error means no contents and no change.

use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cli::{AppContext, EditArgs, WhichArgs};
use crate::core::check::{self, Check};
use crate::core::editor::{Editor, EditorError, ShellEditor, default_editor};
use crate::infra::config::{Config, load_config};
use crate::infra::io::{with_temp_file, write_atomic, write_in_place};

/// Default temp file name prefix
pub const TEMP_PREFIX: &str = "editprompt-";

/// How a validated change reaches the original file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMode {
    /// Truncate and rewrite the original file
    #[default]
    InPlace,
    /// Write a sibling file and rename it over the original
    Atomic,
}

/// Result of a completed prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    contents: Vec<u8>,
    changed: bool,
}

impl EditOutcome {
    /// Contents after editing (equal to the original when unchanged)
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    /// True when new bytes were validated and committed
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// Edit prompt errors. The original file is untouched for every kind except
/// `Commit`.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("cannot stat {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("temporary file failure")]
    TempFile(#[from] std::io::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Message is exactly the rule's own
    #[error(transparent)]
    Validation(anyhow::Error),

    #[error("cannot write {}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PromptError {
    /// Rejected by the validation rule, as opposed to an I/O or editor failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Edit prompt bound to one editor
pub struct Prompt<'e> {
    editor: &'e dyn Editor,
    temp_prefix: String,
    commit: CommitMode,
}

impl Default for Prompt<'static> {
    fn default() -> Self {
        Self::new(default_editor())
    }
}

impl<'e> Prompt<'e> {
    pub fn new(editor: &'e dyn Editor) -> Self {
        Self {
            editor,
            temp_prefix: TEMP_PREFIX.to_string(),
            commit: CommitMode::default(),
        }
    }

    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    pub fn with_commit_mode(mut self, mode: CommitMode) -> Self {
        self.commit = mode;
        self
    }

    /// Run the edit, validate, commit sequence on `path`.
    ///
    /// `validate` only runs when the editor changed the bytes.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn edit<P, V>(&self, path: P, validate: V) -> Result<EditOutcome, PromptError>
    where
        P: AsRef<Path>,
        V: FnOnce(&[u8]) -> AnyResult<()>,
    {
        let path = path.as_ref();

        // Mode is captured before anything can change it
        let perms: Permissions = fs::metadata(path)
            .map_err(|source| PromptError::Stat { path: path.to_path_buf(), source })?
            .permissions();

        let original =
            fs::read(path).map_err(|source| PromptError::Read { path: path.to_path_buf(), source })?;

        // The temp file is gone before anything touches the original
        let suffix = temp_suffix(path);
        let edited = with_temp_file(
            &self.temp_prefix,
            &suffix,
            &original,
            |tmp| -> Result<Vec<u8>, PromptError> {
                self.editor.edit(tmp)?;
                fs::read(tmp)
                    .map_err(|source| PromptError::Read { path: tmp.to_path_buf(), source })
            },
        )?;

        if edited == original {
            debug!(bytes = edited.len(), "no changes");
            return Ok(EditOutcome { contents: edited, changed: false });
        }

        validate(&edited).map_err(PromptError::Validation)?;

        let write: fn(&Path, &[u8], &Permissions) -> std::io::Result<()> = match self.commit {
            CommitMode::InPlace => write_in_place,
            CommitMode::Atomic => write_atomic,
        };
        write(path, &edited, &perms)
            .map_err(|source| PromptError::Commit { path: path.to_path_buf(), source })?;

        info!(bytes = edited.len(), mode = ?self.commit, "committed");
        Ok(EditOutcome { contents: edited, changed: true })
    }
}

/// Edit `path` with the process default editor. See [`Prompt::edit`].
pub fn edit<P, V>(path: P, validate: V) -> Result<EditOutcome, PromptError>
where
    P: AsRef<Path>,
    V: FnOnce(&[u8]) -> AnyResult<()>,
{
    Prompt::default().edit(path, validate)
}

/// Keep the original extension so editors pick the right syntax
fn temp_suffix(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// `edp edit`
pub fn run(args: EditArgs, ctx: &AppContext) -> AnyResult<()> {
    let config = load_config()?;

    let editor = resolve_editor(args.editor.as_deref(), &config);
    let checks = build_checks(&args, &config)?;
    let commit = if args.atomic { CommitMode::Atomic } else { config.commit };

    let path = PathBuf::from(
        shellexpand::full(&args.file)
            .map_err(|e| anyhow::anyhow!("cannot expand {}: {e}", args.file))?
            .as_ref(),
    );

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", ctx.paint_warn("DRY RUN: Would edit:"));
            println!("  File: {}", path.display());
            println!("  Editor: {editor}");
            println!("  Checks: {}", check::describe(&checks));
            println!("  Commit: {commit:?}");
        }
        return Ok(());
    }

    let prompt = Prompt::new(&editor)
        .with_temp_prefix(config.temp_prefix.clone())
        .with_commit_mode(commit);

    let outcome = prompt.edit(&path, |bytes| check::run_checks(&checks, bytes))?;

    if !ctx.quiet {
        if outcome.is_changed() {
            println!("{} Updated {}", ctx.paint_ok("✓"), path.display());
        } else {
            println!("No changes to {}", path.display());
        }
    }

    Ok(())
}

/// `edp which`
pub fn which(args: WhichArgs, ctx: &AppContext) -> AnyResult<()> {
    let config = load_config()?;
    let editor = resolve_editor(args.editor.as_deref(), &config);

    if !ctx.quiet {
        println!("{editor}");
    }
    Ok(())
}

/// `--editor` flag, then config, then `EDITOR`
///
/// A blank value at any level falls through to the next one.
pub fn resolve_editor(flag: Option<&str>, config: &Config) -> ShellEditor {
    flag.and_then(ShellEditor::parse)
        .or_else(|| config.editor.as_deref().and_then(ShellEditor::parse))
        .unwrap_or_else(|| default_editor().clone())
}

fn build_checks(args: &EditArgs, config: &Config) -> AnyResult<Vec<Check>> {
    let mut checks = Vec::new();

    if args.utf8 || config.checks.utf8 {
        checks.push(Check::Utf8);
    }
    if args.non_empty || config.checks.non_empty {
        checks.push(Check::NonEmpty);
    }
    for cmd in args.check.iter().chain(config.checks.command.iter()) {
        checks.push(Check::parse_command(cmd)?);
    }

    Ok(checks)
}
