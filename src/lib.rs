//! **editprompt** - visudo-like edit, validate, commit prompt
//!
//! Copies a file to a temp location, opens it in the user's editor, and
//! writes the result back only when it changed and the caller's validation
//! rule accepts it.

/// Command-line interface with clap integration
pub mod cli;

/// Editor capability and the edit prompt itself
pub mod core {
    /// Editor trait, external-command editor and `EDITOR` resolution
    pub mod editor;
    pub use editor::{Editor, EditorError, ShellEditor, default_editor};

    /// Edit, validate, commit orchestration
    pub mod prompt;
    pub use prompt::{CommitMode, EditOutcome, Prompt, PromptError, edit};

    /// Byte-level validation rules for the CLI
    pub mod check;
    pub use check::{Check, run_checks};
}

/// Infrastructure - configuration and file I/O
pub mod infra {
    /// Layered configuration from editprompt.toml and EDITPROMPT_* variables
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Scoped temp files and commit writers
    pub mod io;
}

// Strategic re-exports for embedding callers
pub use cli::{AppContext, Cli, Commands};
pub use core::{CommitMode, EditOutcome, Editor, EditorError, Prompt, PromptError, ShellEditor, edit};
pub use infra::{Config, load_config};
