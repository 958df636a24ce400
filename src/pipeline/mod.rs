//! Worklist scanning and the sequential run loop.
//!
//! One run takes a snapshot of the worksheet, derives the worklist of
//! unprocessed rows, and works through it strictly one record at a time.
//! `PROCESSING` is an advisory marker only: two invocations overlapping
//! externally can both pick up a row before either writes the marker. The
//! cron-style deployment model accepts that race instead of locking.

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::sheets::{GoogleSheetsClient, TabularStore};
use crate::summarize::{GeminiClient, SummaryProvider};
use crate::transcript::{SupadataClient, TranscriptSource};
use crate::utils::is_supported_video_url;
use crate::{Result, SheetScribeError};

pub mod processor;
#[cfg(test)]
pub(crate) mod testing;

use processor::RecordProcessor;

/// One unprocessed row picked up by the scanner.
///
/// A snapshot of the row's identity only; status and result are overwritten
/// by row index during processing, never carried forward in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklistEntry {
    pub url: String,
    /// 1-indexed worksheet row, stable for the run
    pub row: u32,
}

/// Aggregate counts for one pipeline pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub processed: usize,
    pub errors: usize,
}

/// Derive the worklist from a worksheet snapshot, preserving row order.
///
/// A row is eligible when it has cells, column A holds a supported video URL,
/// and column C is empty. Any non-empty status cell marks the row as already
/// handled - including values this tool never writes - so rows annotated by
/// hand stay untouched.
pub fn scan_rows(rows: &[Vec<String>]) -> Vec<WorklistEntry> {
    let mut entries = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }

        let url = row.first().map(|cell| cell.trim()).unwrap_or("");
        let status = row.get(2).map(|cell| cell.trim()).unwrap_or("");

        if url.is_empty() || !is_supported_video_url(url) {
            continue;
        }

        if !status.is_empty() {
            continue;
        }

        entries.push(WorklistEntry {
            url: url.to_string(),
            row: (idx + 1) as u32,
        });
    }

    entries
}

/// Drives one full pass: scan the worksheet, then process each entry in order.
pub struct SummaryPipeline {
    store: Box<dyn TabularStore>,
    transcripts: Box<dyn TranscriptSource>,
    summarizer: Box<dyn SummaryProvider>,
    show_progress: bool,
}

impl SummaryPipeline {
    /// Create a pipeline with real collaborators from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = GoogleSheetsClient::new(&config.sheets).await?;
        let transcripts = SupadataClient::new(&config.supadata)?;
        let summarizer = GeminiClient::new(&config.gemini)?;

        Ok(Self::with_components(
            Box::new(store),
            Box::new(transcripts),
            Box::new(summarizer),
        ))
    }

    /// Assemble a pipeline from explicit collaborators.
    pub fn with_components(
        store: Box<dyn TabularStore>,
        transcripts: Box<dyn TranscriptSource>,
        summarizer: Box<dyn SummaryProvider>,
    ) -> Self {
        Self {
            store,
            transcripts,
            summarizer,
            show_progress: false,
        }
    }

    /// Show a progress bar while working through the worklist.
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Scan the worksheet for unprocessed rows.
    ///
    /// A store read failure yields no worklist at all, never a partial one.
    pub async fn scan(&self) -> std::result::Result<Vec<WorklistEntry>, SheetScribeError> {
        let rows = self.store.rows().await?;
        let entries = scan_rows(&rows);
        tracing::info!("Found {} new URLs to process", entries.len());
        Ok(entries)
    }

    /// Run one full pass over the worklist.
    ///
    /// Per-record failures are contained by the processor and only tallied
    /// here; a scan failure ends the run with nothing attempted. This method
    /// never raises past its own boundary.
    pub async fn run(&self, limit: Option<usize>) -> RunSummary {
        tracing::info!("Starting video summarization pipeline");

        let worklist = match self.scan().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Pipeline failed: {}", e);
                return RunSummary::default();
            }
        };

        if worklist.is_empty() {
            tracing::info!("No new URLs to process");
            return RunSummary::default();
        }

        let take = limit.unwrap_or(worklist.len()).min(worklist.len());
        if take < worklist.len() {
            tracing::info!("Limiting this pass to {} of {} entries", take, worklist.len());
        }

        let mut summary = RunSummary {
            discovered: worklist.len(),
            ..Default::default()
        };

        let progress = if self.show_progress {
            let bar = ProgressBar::new(take as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap(),
            );
            Some(bar)
        } else {
            None
        };

        let processor = RecordProcessor::new(
            self.store.as_ref(),
            self.transcripts.as_ref(),
            self.summarizer.as_ref(),
        );

        for entry in worklist.iter().take(take) {
            if let Some(bar) = &progress {
                bar.set_message(entry.url.clone());
            }

            match processor.process(entry).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", entry.url, e);
                    summary.errors += 1;
                }
            }

            if let Some(bar) = &progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }

        tracing::info!(
            "Processing complete. Success: {}, Errors: {}",
            summary.processed,
            summary.errors
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::{FakeStore, FakeSummarizer, FakeTranscripts};
    use super::*;
    use crate::sheets::SheetColumn;

    fn row(url: &str, result: &str, status: &str) -> Vec<String> {
        vec![url.to_string(), result.to_string(), status.to_string()]
    }

    fn entry(url: &str, row: u32) -> WorklistEntry {
        WorklistEntry {
            url: url.to_string(),
            row,
        }
    }

    #[test]
    fn test_scan_single_eligible_row() {
        let rows = vec![row("https://youtu.be/abc", "", "")];
        assert_eq!(scan_rows(&rows), vec![entry("https://youtu.be/abc", 1)]);
    }

    #[test]
    fn test_scan_skips_rows_with_any_status() {
        let rows = vec![
            row("https://youtu.be/a", "", "COMPLETED"),
            row("https://youtu.be/b", "", "PROCESSING"),
            row("https://youtu.be/c", "", "ERROR"),
            row("https://youtu.be/d", "", "reviewed by hand"),
            row("https://youtu.be/e", "", "  "),
        ];
        // only whitespace counts as empty
        assert_eq!(scan_rows(&rows), vec![entry("https://youtu.be/e", 5)]);
    }

    #[test]
    fn test_scan_skips_unsupported_and_empty_urls() {
        let rows = vec![
            row("", "", ""),
            row("https://example.com/watch", "", ""),
            row("some notes, not a url", "", ""),
            row("https://vimeo.com/42", "", ""),
        ];
        assert_eq!(scan_rows(&rows), vec![entry("https://vimeo.com/42", 4)]);
    }

    #[test]
    fn test_scan_handles_short_and_empty_rows() {
        let rows = vec![
            vec![],
            vec!["https://youtu.be/abc".to_string()], // no result or status column
        ];
        assert_eq!(scan_rows(&rows), vec![entry("https://youtu.be/abc", 2)]);
    }

    #[test]
    fn test_scan_preserves_row_order_and_is_idempotent() {
        let rows = vec![
            row("https://youtu.be/first", "", ""),
            row("https://example.com/skip", "", ""),
            row("https://youtu.be/second", "", ""),
        ];
        let entries = scan_rows(&rows);
        assert_eq!(
            entries,
            vec![entry("https://youtu.be/first", 1), entry("https://youtu.be/second", 3)]
        );
        assert_eq!(scan_rows(&rows), entries);
    }

    fn pipeline_with(
        store: Arc<FakeStore>,
        transcripts: FakeTranscripts,
        summarizer: FakeSummarizer,
    ) -> SummaryPipeline {
        SummaryPipeline::with_components(
            Box::new(store),
            Box::new(transcripts),
            Box::new(summarizer),
        )
    }

    #[tokio::test]
    async fn test_run_success_writes_completed_row() {
        let store = Arc::new(FakeStore::with_rows(vec![row("https://youtu.be/abc", "", "")]));
        let transcripts = FakeTranscripts::new().respond("https://youtu.be/abc", "the transcript");
        let summarizer = FakeSummarizer::returning("a tidy summary");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(None)
            .await;

        assert_eq!(
            summary,
            RunSummary {
                discovered: 1,
                processed: 1,
                errors: 0
            }
        );
        assert_eq!(
            store.writes(),
            vec![
                (1, SheetColumn::Status, "PROCESSING".to_string()),
                (1, SheetColumn::Result, "a tidy summary".to_string()),
                (1, SheetColumn::Status, "COMPLETED".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_fetch_failure_marks_error_row() {
        let store = Arc::new(FakeStore::with_rows(vec![row("https://youtu.be/abc", "", "")]));
        let transcripts = FakeTranscripts::new().fail("https://youtu.be/abc");
        let summarizer = FakeSummarizer::returning("unused");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(None)
            .await;

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.errors, 1);

        let writes = store.writes();
        assert_eq!(writes[0], (1, SheetColumn::Status, "PROCESSING".to_string()));
        assert_eq!(writes[1].1, SheetColumn::Result);
        assert!(writes[1]
            .2
            .starts_with("Error: Could not retrieve transcript using Supadata"));
        assert_eq!(writes[2], (1, SheetColumn::Status, "ERROR".to_string()));
    }

    #[tokio::test]
    async fn test_run_scan_failure_performs_no_writes() {
        let store = Arc::new(FakeStore::failing_reads());
        let transcripts = FakeTranscripts::new();
        let summarizer = FakeSummarizer::returning("unused");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(None)
            .await;

        assert_eq!(summary, RunSummary::default());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_run_empty_worklist_is_a_clean_noop() {
        let store = Arc::new(FakeStore::with_rows(vec![row(
            "https://youtu.be/done",
            "old summary",
            "COMPLETED",
        )]));
        let transcripts = FakeTranscripts::new();
        let summarizer = FakeSummarizer::returning("unused");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(None)
            .await;

        assert_eq!(summary, RunSummary::default());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_run_isolates_failures_between_entries() {
        let store = Arc::new(FakeStore::with_rows(vec![
            row("https://youtu.be/one", "", ""),
            row("https://youtu.be/two", "", ""),
        ]));
        let transcripts = FakeTranscripts::new()
            .respond("https://youtu.be/one", "first transcript")
            .respond("https://youtu.be/two", "second transcript");
        let summarizer = FakeSummarizer::returning("summary").fail_for("first transcript");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(None)
            .await;

        assert_eq!(
            summary,
            RunSummary {
                discovered: 2,
                processed: 1,
                errors: 1
            }
        );

        let writes = store.writes();
        let row1_status: Vec<&str> = writes
            .iter()
            .filter(|(row, col, _)| *row == 1 && *col == SheetColumn::Status)
            .map(|(_, _, value)| value.as_str())
            .collect();
        let row2_status: Vec<&str> = writes
            .iter()
            .filter(|(row, col, _)| *row == 2 && *col == SheetColumn::Status)
            .map(|(_, _, value)| value.as_str())
            .collect();
        assert_eq!(row1_status, vec!["PROCESSING", "ERROR"]);
        assert_eq!(row2_status, vec!["PROCESSING", "COMPLETED"]);
    }

    #[tokio::test]
    async fn test_run_respects_limit() {
        let store = Arc::new(FakeStore::with_rows(vec![
            row("https://youtu.be/one", "", ""),
            row("https://youtu.be/two", "", ""),
        ]));
        let transcripts = FakeTranscripts::new()
            .respond("https://youtu.be/one", "first")
            .respond("https://youtu.be/two", "second");
        let summarizer = FakeSummarizer::returning("summary");

        let summary = pipeline_with(store.clone(), transcripts, summarizer)
            .run(Some(1))
            .await;

        assert_eq!(
            summary,
            RunSummary {
                discovered: 2,
                processed: 1,
                errors: 0
            }
        );
        // row 2 was never touched
        assert!(store.writes().iter().all(|(row, _, _)| *row == 1));
    }
}
