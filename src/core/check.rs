//! Byte-level validation rules for `edp edit`.
//!
//! None of these look at the file format; anything smarter belongs in an
//! external `--check` command.

use std::io::{ErrorKind, Write};
use std::process::{ChildStdin, Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::editor::ShellEditor;

/// A single validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Content must be valid UTF-8
    Utf8,
    /// Content must contain something besides whitespace
    NonEmpty,
    /// External program reading the content on stdin; non-zero exit rejects
    Command { program: String, args: Vec<String> },
}

impl Check {
    /// Tokenize a check command the same way `EDITOR` is tokenized
    pub fn parse_command(value: &str) -> Result<Self> {
        let cmd = ShellEditor::parse(value)
            .with_context(|| format!("empty check command: {value:?}"))?;

        Ok(Self::Command {
            program: cmd.command().to_string(),
            args: cmd.params().to_vec(),
        })
    }

    pub fn run(&self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Utf8 => {
                if let Err(e) = std::str::from_utf8(bytes) {
                    bail!("not valid UTF-8: {e}");
                }
                Ok(())
            }
            Self::NonEmpty => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    bail!("content is empty");
                }
                Ok(())
            }
            Self::Command { program, args } => run_command(program, args, bytes),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Utf8 => "utf8".to_string(),
            Self::NonEmpty => "non-empty".to_string(),
            Self::Command { program, args } if args.is_empty() => format!("`{program}`"),
            Self::Command { program, args } => format!("`{program} {}`", args.join(" ")),
        }
    }
}

/// Run every check in order; the first failure wins
pub fn run_checks(checks: &[Check], bytes: &[u8]) -> Result<()> {
    for check in checks {
        debug!(check = %check.label(), "validating");
        check.run(bytes)?;
    }
    Ok(())
}

/// Human-readable list for dry runs
pub fn describe(checks: &[Check]) -> String {
    if checks.is_empty() {
        return "none".to_string();
    }
    checks.iter().map(Check::label).collect::<Vec<_>>().join(", ")
}

fn run_command(program: &str, args: &[String], bytes: &[u8]) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn check `{program}`"))?;

    // Stdin is fed from its own thread while this one drains stderr
    let stdin = child.stdin.take();
    let (written, output) = std::thread::scope(|s| {
        let writer = s.spawn(move || feed_stdin(stdin, bytes));
        let output = child.wait_with_output();
        (writer.join(), output)
    });

    let output = output.with_context(|| format!("failed to wait for check `{program}`"))?;
    match written {
        Ok(res) => res.context("failed to write content to check stdin")?,
        Err(_) => bail!("stdin writer for check `{program}` panicked"),
    }

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        bail!("check `{program}` failed with {}", output.status);
    }
    bail!("{stderr}")
}

/// Write everything, then close the pipe. A checker may exit without
/// reading it all.
fn feed_stdin(stdin: Option<ChildStdin>, bytes: &[u8]) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    match stdin.write_all(bytes) {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}
