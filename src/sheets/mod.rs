use std::sync::Arc;

use async_trait::async_trait;

use crate::SheetScribeError;

pub mod client;

pub use client::GoogleSheetsClient;

/// Worksheet columns, by position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetColumn {
    /// Column A: source video URL, filled in by an external actor
    Url,
    /// Column B: summary text or error message
    Result,
    /// Column C: processing status marker
    Status,
}

impl SheetColumn {
    pub fn letter(&self) -> &'static str {
        match self {
            SheetColumn::Url => "A",
            SheetColumn::Result => "B",
            SheetColumn::Status => "C",
        }
    }
}

/// Status marker written to the status column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Processing,
    Completed,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Processing => "PROCESSING",
            RecordStatus::Completed => "COMPLETED",
            RecordStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/write access to the worksheet holding the records.
///
/// The worksheet is the sole durable home of record state; the pipeline only
/// keeps a transient snapshot per run.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Fetch every row of the worksheet as formatted cell values.
    async fn rows(&self) -> Result<Vec<Vec<String>>, SheetScribeError>;

    /// Write a single cell. `row` is 1-indexed to match A1 notation.
    async fn write_cell(
        &self,
        row: u32,
        column: SheetColumn,
        value: &str,
    ) -> Result<(), SheetScribeError>;
}

#[async_trait]
impl<T: TabularStore + ?Sized> TabularStore for Arc<T> {
    async fn rows(&self) -> Result<Vec<Vec<String>>, SheetScribeError> {
        (**self).rows().await
    }

    async fn write_cell(
        &self,
        row: u32,
        column: SheetColumn,
        value: &str,
    ) -> Result<(), SheetScribeError> {
        (**self).write_cell(row, column, value).await
    }
}
