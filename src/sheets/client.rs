use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{SheetColumn, TabularStore};
use crate::config::SheetsConfig;
use crate::SheetScribeError;

/// OAuth scope required for reading and writing sheet values
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets v4 REST client authenticated with a service account.
pub struct GoogleSheetsClient {
    http: Client,
    auth: Arc<dyn TokenProvider>,
    spreadsheet_id: String,
    worksheet: String,
}

/// Response payload of `values.get`. `values` is absent for an empty sheet.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl GoogleSheetsClient {
    /// Create a client for one spreadsheet/worksheet pair.
    pub async fn new(config: &SheetsConfig) -> crate::Result<Self> {
        let auth = Self::create_auth_provider(config)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sheetscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!("Google Sheets client initialized for spreadsheet {}", config.spreadsheet_id);

        Ok(Self {
            http,
            auth,
            spreadsheet_id: config.spreadsheet_id.clone(),
            worksheet: config.worksheet.clone(),
        })
    }

    fn create_auth_provider(config: &SheetsConfig) -> crate::Result<Arc<dyn TokenProvider>> {
        if let Some(credentials) = &config.credentials_json {
            let service_account = CustomServiceAccount::from_json(credentials).map_err(|e| {
                SheetScribeError::Setup(format!("invalid GOOGLE_CREDENTIALS: {}", e))
            })?;
            return Ok(Arc::new(service_account));
        }

        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            SheetScribeError::Setup(format!("failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(SheetScribeError::Setup(
                "GOOGLE_CREDENTIALS or GOOGLE_APPLICATION_CREDENTIALS must be set".to_string(),
            )
            .into()),
        }
    }

    async fn bearer_token(&self) -> Result<String, gcp_auth::Error> {
        let token = self.auth.token(&[SHEETS_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    fn sheet_range(&self) -> String {
        format!("'{}'", self.worksheet)
    }
}

/// A1 range for a single cell, with the worksheet title quoted so titles
/// containing spaces keep working.
fn cell_range(worksheet: &str, row: u32, column: SheetColumn) -> String {
    format!("'{}'!{}{}", worksheet, column.letter(), row)
}

/// Full `values` endpoint URL for a range.
fn values_endpoint(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}",
        SHEETS_API_BASE,
        spreadsheet_id,
        urlencoding::encode(range)
    )
}

#[async_trait]
impl TabularStore for GoogleSheetsClient {
    async fn rows(&self) -> Result<Vec<Vec<String>>, SheetScribeError> {
        let token = self
            .bearer_token()
            .await
            .map_err(|e| SheetScribeError::Scan(format!("auth token: {}", e)))?;

        let url = values_endpoint(&self.spreadsheet_id, &self.sheet_range());
        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SheetScribeError::Scan(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetScribeError::Scan(format!("HTTP {}: {}", status, body)));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetScribeError::Scan(format!("malformed response: {}", e)))?;

        tracing::debug!("Fetched {} rows from worksheet '{}'", range.values.len(), self.worksheet);
        Ok(range.values)
    }

    async fn write_cell(
        &self,
        row: u32,
        column: SheetColumn,
        value: &str,
    ) -> Result<(), SheetScribeError> {
        let token = self
            .bearer_token()
            .await
            .map_err(|e| SheetScribeError::Write(format!("auth token: {}", e)))?;

        let range = cell_range(&self.worksheet, row, column);
        let url = values_endpoint(&self.spreadsheet_id, &range);

        let response = self
            .http
            .put(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [[value]] }))
            .send()
            .await
            .map_err(|e| SheetScribeError::Write(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetScribeError::Write(format!(
                "{}: HTTP {}: {}",
                range, status, body
            )));
        }

        Ok(())
    }
}
