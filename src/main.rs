use clap::Parser;
use rusty_tasks::cli::Cli;
use rusty_tasks::commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn install_tracing(verbose: bool) {
    // RUST_LOG wins over the default level.
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    match commands::run(cli.config.as_deref(), cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
