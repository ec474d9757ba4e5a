//! Docpilot CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use docpilot_cli::cli::{Cli, Commands};
use docpilot_cli::commands;
use docpilot_cli::repl::Repl;

fn main() {
    // Secrets (OPENROUTER_API_KEY) from the working directory, then the config dir
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_path(docpilot_core::env_file());

    let mut cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command.take() {
        Some(Commands::Chat) | None => run_repl(&cli),
        Some(cmd) => commands::execute(cmd, &cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_repl(cli: &Cli) -> commands::Result<()> {
    let mut repl = Repl::new(cli)?;
    repl.run()
}
