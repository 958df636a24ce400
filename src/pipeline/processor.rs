//! Per-record processing: the status writer and the state machine that takes
//! one worklist entry from `PROCESSING` to a terminal status.

use crate::pipeline::WorklistEntry;
use crate::sheets::{RecordStatus, SheetColumn, TabularStore};
use crate::summarize::{SummaryProvider, SUMMARY_PROMPT};
use crate::transcript::TranscriptSource;
use crate::utils::truncate_with_marker;
use crate::SheetScribeError;

/// Sheets rejects cells over this size; results are clamped before writing.
/// Independent of the transcript clamp applied before summarization.
pub const MAX_CELL_CHARS: usize = 50_000;

/// Persists status and result markers, tolerating partial failure.
///
/// The result write and the status write are independent operations: losing
/// one must not lose the other. Neither failure escapes this type; both end
/// in an error log line.
pub struct StatusWriter<'a> {
    store: &'a dyn TabularStore,
}

impl<'a> StatusWriter<'a> {
    pub fn new(store: &'a dyn TabularStore) -> Self {
        Self { store }
    }

    pub async fn write(&self, row: u32, status: RecordStatus, result: &str) {
        if !result.is_empty() {
            let result = truncate_with_marker(result, MAX_CELL_CHARS);
            match self.store.write_cell(row, SheetColumn::Result, &result).await {
                Ok(()) => tracing::info!("Updated result in B{}", row),
                Err(e) => tracing::error!("Failed to update result in B{}: {}", row, e),
            }
        }

        match self
            .store
            .write_cell(row, SheetColumn::Status, status.as_str())
            .await
        {
            Ok(()) => tracing::info!("Updated status in C{}: {}", row, status),
            Err(e) => tracing::error!("Failed to update status in C{}: {}", row, e),
        }
    }
}

/// Runs one worklist entry through the fetch-summarize-persist sequence.
pub struct RecordProcessor<'a> {
    transcripts: &'a dyn TranscriptSource,
    summarizer: &'a dyn SummaryProvider,
    writer: StatusWriter<'a>,
}

impl<'a> RecordProcessor<'a> {
    pub fn new(
        store: &'a dyn TabularStore,
        transcripts: &'a dyn TranscriptSource,
        summarizer: &'a dyn SummaryProvider,
    ) -> Self {
        Self {
            transcripts,
            summarizer,
            writer: StatusWriter::new(store),
        }
    }

    /// Process one record to a terminal status.
    ///
    /// Every failure inside the attempt lands here, is persisted as the
    /// row's `ERROR` status with a readable message, and is returned already
    /// contained - callers only tally it. The initial `PROCESSING` write is
    /// best-effort and never aborts the attempt.
    pub async fn process(&self, entry: &WorklistEntry) -> Result<(), SheetScribeError> {
        tracing::info!("Processing URL: {} (row {})", entry.url, entry.row);

        self.writer
            .write(entry.row, RecordStatus::Processing, "")
            .await;

        match self.attempt(entry).await {
            Ok(summary) => {
                self.writer
                    .write(entry.row, RecordStatus::Completed, &summary)
                    .await;
                tracing::info!("Successfully processed URL: {}", entry.url);
                Ok(())
            }
            Err(e) => {
                let message = format!("Error: {}", e);
                self.writer
                    .write(entry.row, RecordStatus::Error, &message)
                    .await;
                Err(e)
            }
        }
    }

    async fn attempt(&self, entry: &WorklistEntry) -> Result<String, SheetScribeError> {
        let transcript = self.transcripts.transcript(&entry.url).await?;
        if transcript.text.trim().is_empty() {
            return Err(SheetScribeError::Fetch(
                "provider returned empty text".to_string(),
            ));
        }
        tracing::info!(
            "Retrieved transcript ({} characters)",
            transcript.text.chars().count()
        );

        let summary = self
            .summarizer
            .summarize(&transcript.text, SUMMARY_PROMPT)
            .await?;
        if summary.trim().is_empty() {
            return Err(SheetScribeError::Summarize(
                "model returned empty text".to_string(),
            ));
        }

        Ok(summary)
    }
}
