use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scribe",
    about = concat!("scribe v", env!("CARGO_PKG_VERSION"), " - tags, links and dates as you type"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different vault directory
    #[arg(short = 'C', long = "vault-dir", global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Append logs to this file (filter with SCRIBE_LOG)
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Note to open in the editor, relative to the vault root
    #[arg(short, long, default_value = "Untitled.md")]
    pub file: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Make the current directory a scribe vault
    Init,
    /// List completions for text typed before the caret
    Complete(CompleteArgs),
    /// List the vault's tags, most used first
    Tags,
    /// Show what confirming the date picker would insert
    Date(DateArgs),
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Text before the caret
    pub text: String,
    /// Text after the caret
    #[arg(long, default_value = "")]
    pub after: String,
    /// Vault-relative path of the note being edited
    #[arg(long)]
    pub file: Option<String>,
    /// Show at most this many candidates
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Use this date as today (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Args)]
pub struct DateArgs {
    /// Text before the caret, ending in the date trigger and optionally a
    /// typed date
    pub text: String,
    /// Use this date as today (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,
}
