//! SheetScribe - a batch pipeline that summarizes video links from a Google Sheet
//!
//! Scans a worksheet for video URLs that have no status yet, pulls a plain-text
//! transcript for each via the Supadata API, summarizes it with Gemini, and writes
//! the summary and a status marker back to the sheet. Intended to be invoked from
//! cron and run to completion.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod sheets;
pub mod summarize;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::{RunSummary, SummaryPipeline, WorklistEntry};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the pipeline.
///
/// `Fetch` and `Summarize` are per-record failures: the record processor
/// contains them and persists them as that row's `ERROR` status. `Setup` and
/// `Scan` end the run before any record is touched. `Write` failures are
/// logged where they happen and never escalate.
#[derive(thiserror::Error, Debug)]
pub enum SheetScribeError {
    #[error("Missing required configuration: {0}")]
    Setup(String),

    #[error("Failed to read rows from worksheet: {0}")]
    Scan(String),

    #[error("Could not retrieve transcript using Supadata: {0}")]
    Fetch(String),

    #[error("Gemini analysis failed: {0}")]
    Summarize(String),

    #[error("Failed to update sheet: {0}")]
    Write(String),
}
