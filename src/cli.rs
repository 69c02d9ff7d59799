use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;

/// Binary name baked into completion scripts
const BIN_NAME: &str = "edp";

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

impl AppContext {
    /// Success marker, green unless --no-color
    pub fn paint_ok(&self, s: &str) -> String {
        if self.no_color { s.to_string() } else { s.green().to_string() }
    }

    pub fn paint_warn(&self, s: &str) -> String {
        if self.no_color { s.to_string() } else { s.yellow().to_string() }
    }

    pub fn paint_err(&self, s: &str) -> String {
        if self.no_color { s.to_string() } else { s.red().to_string() }
    }
}

#[derive(Parser)]
#[command(name = "edp")]
#[command(about = "Edit a file in $EDITOR, validate the result, and commit it only if it passes")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Edit a file, validate the changes and write them back
    Edit(EditArgs),

    /// Print the editor command that `edit` would launch
    Which(WhichArgs),

    /// Initialize an editprompt.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// File to edit (~ and $VARS are expanded)
    pub file: String,

    /// Editor command line, overriding config and $EDITOR
    #[arg(short, long)]
    pub editor: Option<String>,

    /// Reject content that is not valid UTF-8
    #[arg(long)]
    pub utf8: bool,

    /// Reject empty or whitespace-only content
    #[arg(long)]
    pub non_empty: bool,

    /// Validation command fed the new content on stdin (repeatable)
    #[arg(short, long = "check", value_name = "CMD")]
    pub check: Vec<String>,

    /// Replace the file by rename instead of rewriting it in place
    #[arg(long)]
    pub atomic: bool,
}

#[derive(Debug, Args)]
pub struct WhichArgs {
    /// Editor command line, overriding config and $EDITOR
    #[arg(short, long)]
    pub editor: Option<String>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,

    /// Write `edp.<ext>` into this directory instead of printing to stdout
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Print or save the completion script for `args.shell`
pub fn completions(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    let Some(dir) = args.out_dir else {
        return write_completions(args.shell, &mut std::io::stdout().lock());
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create {}", dir.display()))?;
    let path = clap_complete::generate_to(args.shell, &mut Cli::command(), BIN_NAME, &dir)
        .with_context(|| format!("cannot write completions into {}", dir.display()))?;

    if !ctx.quiet {
        eprintln!("{} {}", ctx.paint_ok("wrote"), path.display());
    }
    Ok(())
}

pub fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut buf);
    out.write_all(&buf).context("cannot write completions")
}
