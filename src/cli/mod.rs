use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sheetscribe",
    about = "Summarize video links from a Google Sheet using Supadata transcripts and Gemini",
    version,
    long_about = "A batch CLI tool that scans a Google Sheets worksheet for unprocessed video URLs, pulls a plain-text transcript for each via the Supadata API, summarizes it with Gemini, and writes the summary and a status marker back to the sheet. Designed to run to completion from cron."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the worksheet and process every unhandled video URL
    Run {
        /// List eligible rows without processing them
        #[arg(long)]
        dry_run: bool,

        /// Process at most this many rows this pass
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },

    /// Show the resolved configuration
    Config {
        /// Show current configuration (default prints the config file path)
        #[arg(short, long)]
        show: bool,
    },

    /// List supported video platforms
    Platforms,
}
