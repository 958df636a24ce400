//! Hand-rolled fakes for the pipeline's collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::sheets::{SheetColumn, TabularStore};
use crate::summarize::SummaryProvider;
use crate::transcript::{Transcript, TranscriptSource};
use crate::SheetScribeError;

/// In-memory store that records every successful cell write.
pub struct FakeStore {
    cells: Vec<Vec<String>>,
    fail_reads: bool,
    fail_result_writes: bool,
    writes: Mutex<Vec<(u32, SheetColumn, String)>>,
}

impl FakeStore {
    pub fn with_rows(cells: Vec<Vec<String>>) -> Self {
        Self {
            cells,
            fail_reads: false,
            fail_result_writes: false,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::with_rows(Vec::new())
        }
    }

    pub fn reject_result_writes(mut self) -> Self {
        self.fail_result_writes = true;
        self
    }

    /// Writes observed so far, in order.
    pub fn writes(&self) -> Vec<(u32, SheetColumn, String)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TabularStore for FakeStore {
    async fn rows(&self) -> Result<Vec<Vec<String>>, SheetScribeError> {
        if self.fail_reads {
            return Err(SheetScribeError::Scan("backend unavailable".to_string()));
        }
        Ok(self.cells.clone())
    }

    async fn write_cell(
        &self,
        row: u32,
        column: SheetColumn,
        value: &str,
    ) -> Result<(), SheetScribeError> {
        if self.fail_result_writes && column == SheetColumn::Result {
            return Err(SheetScribeError::Write("result column rejected".to_string()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((row, column, value.to_string()));
        Ok(())
    }
}

/// Transcript source with canned per-URL outcomes.
#[derive(Default)]
pub struct FakeTranscripts {
    responses: HashMap<String, Option<String>>,
}

impl FakeTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, text: &str) -> Self {
        self.responses.insert(url.to_string(), Some(text.to_string()));
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), None);
        self
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn transcript(&self, url: &str) -> Result<Transcript, SheetScribeError> {
        match self.responses.get(url) {
            Some(Some(text)) => Ok(Transcript {
                text: text.clone(),
                lang: Some("en".to_string()),
            }),
            Some(None) => Err(SheetScribeError::Fetch("transcript unavailable".to_string())),
            None => Err(SheetScribeError::Fetch(format!(
                "no canned response for {}",
                url
            ))),
        }
    }
}

/// Summarizer returning a fixed summary, with per-transcript failures.
pub struct FakeSummarizer {
    summary: String,
    fail_for: Vec<String>,
}

impl FakeSummarizer {
    pub fn returning(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            fail_for: Vec::new(),
        }
    }

    pub fn fail_for(mut self, transcript: &str) -> Self {
        self.fail_for.push(transcript.to_string());
        self
    }
}

#[async_trait]
impl SummaryProvider for FakeSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        _instructions: &str,
    ) -> Result<String, SheetScribeError> {
        if self.fail_for.iter().any(|t| t == transcript) {
            return Err(SheetScribeError::Summarize("model unavailable".to_string()));
        }
        Ok(self.summary.clone())
    }
}
