use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::SupadataConfig;
use crate::SheetScribeError;

/// Field names tried, in order, when the response carries no `content`
const FALLBACK_FIELDS: &[&str] = &["text", "transcript", "data", "result"];

/// A fetched transcript, with the provider's detected language when reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub lang: Option<String>,
}

/// Source of plain-text transcripts for supported video URLs
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn transcript(&self, url: &str) -> Result<Transcript, SheetScribeError>;
}

/// Supadata transcript API client
pub struct SupadataClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl SupadataClient {
    pub fn new(config: &SupadataConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sheetscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!("Supadata client initialized");

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl TranscriptSource for SupadataClient {
    async fn transcript(&self, url: &str) -> Result<Transcript, SheetScribeError> {
        tracing::info!("Getting transcript for URL: {}", url);

        let response = self
            .http
            .get(format!("{}/transcript", self.base_url))
            .header("x-api-key", &self.api_key)
            .query(&[
                ("url", url),
                // Preferred language; the provider still auto-detects
                ("lang", self.language.as_str()),
                // Plain text instead of timestamped chunks
                ("text", "true"),
                ("mode", "auto"),
            ])
            .send()
            .await
            .map_err(|e| SheetScribeError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetScribeError::Fetch(format!("HTTP {}: {}", status, body)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SheetScribeError::Fetch(format!("malformed response: {}", e)))?;

        let transcript = extract_transcript_payload(&payload).ok_or_else(|| {
            SheetScribeError::Fetch("unrecognized transcript response shape".to_string())
        })?;

        tracing::info!(
            "Transcript retrieved ({} characters, language: {})",
            transcript.text.chars().count(),
            transcript.lang.as_deref().unwrap_or("unknown")
        );

        Ok(transcript)
    }
}

/// Normalize the provider's response into transcript text.
///
/// The API has returned several shapes over time; strategies are tried in
/// order: an object with a `content` field, a bare string body, then a set
/// of known fallback field names.
fn extract_transcript_payload(payload: &Value) -> Option<Transcript> {
    if let Some(content) = payload.get("content").and_then(Value::as_str) {
        return Some(Transcript {
            text: content.to_string(),
            lang: payload
                .get("lang")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    if let Some(text) = payload.as_str() {
        return Some(Transcript {
            text: text.to_string(),
            lang: None,
        });
    }

    for field in FALLBACK_FIELDS {
        if let Some(value) = payload.get(field) {
            tracing::debug!("Found transcript content in '{}' field", field);
            let text = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            return Some(Transcript { text, lang: None });
        }
    }

    None
}
