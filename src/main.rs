use std::process::ExitCode;

use clap::Parser;
use editprompt::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Env var holding a tracing filter; overrides -v
const LOG_ENV: &str = "EDITPROMPT_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        Commands::Edit(args) => editprompt::core::prompt::run(args, &ctx),
        Commands::Which(args) => editprompt::core::prompt::which(args, &ctx),
        Commands::Init(args) => editprompt::infra::config::init(args, &ctx),
        Commands::Completions(args) => editprompt::cli::completions(args, &ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", ctx.paint_err("error:"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "editprompt=debug",
        _ => "editprompt=trace",
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr; stdout belongs to the editor and command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
