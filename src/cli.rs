use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetcast")]
#[command(author, version, about = "Spreadsheet-driven batch video transcoder")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process pending rows of the sheet
    Run {
        /// Maximum number of rows to attempt (overrides BATCH_SIZE)
        #[arg(short, long)]
        max_rows: Option<usize>,

        /// List the rows that would be attempted without touching them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check availability of external tools
    CheckTools,

    /// Validate configuration and environment
    Validate,

    /// Display version information
    Version,
}
