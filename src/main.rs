use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use scribe::cli::commands::Cli;
use scribe::cli::handlers;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // The editor owns the terminal, so it only logs to a file
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let logging = match (&cli.log, &cli.command) {
        (Some(path), _) => init_file_logging(path, default_level),
        (None, Some(_)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(default_level))
                .with_writer(std::io::stderr)
                .init();
            Ok(())
        }
        (None, None) => Ok(()),
    };
    if let Err(e) = logging {
        eprintln!("error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env("SCRIBE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn init_file_logging(path: &Path, default_level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
