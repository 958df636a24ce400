use std::borrow::Cow;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GeminiConfig;
use crate::utils::truncate_with_marker;
use crate::SheetScribeError;

pub mod prompt;

pub use prompt::SUMMARY_PROMPT;

/// Input clamp applied before sending a transcript to the model. Independent
/// of the output clamp applied when writing results back to the sheet.
pub const MAX_TRANSCRIPT_CHARS: usize = 100_000;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Turns a transcript into structured summary text
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summarize(
        &self,
        transcript: &str,
        instructions: &str,
    ) -> Result<String, SheetScribeError>;
}

/// Gemini generateContent API client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

/// Gemini API request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Gemini API response
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Structured payload the model is constrained to reply with
#[derive(Debug, Deserialize)]
struct SummaryPayload {
    text: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("sheetscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!("Gemini client initialized (model: {})", config.model);

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        )
    }
}

#[async_trait]
impl SummaryProvider for GeminiClient {
    async fn summarize(
        &self,
        transcript: &str,
        instructions: &str,
    ) -> Result<String, SheetScribeError> {
        let input = clamp_transcript(transcript);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: input.into_owned(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: instructions.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: summary_response_schema(),
            },
        };

        let response = self
            .http
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| SheetScribeError::Summarize(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetScribeError::Summarize(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SheetScribeError::Summarize(format!("malformed response: {}", e)))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                SheetScribeError::Summarize("response contained no candidates".to_string())
            })?;

        let summary = parse_summary_payload(&text)?;
        tracing::info!("Gemini analysis completed");
        Ok(summary)
    }
}

/// Schema constraining the model to a single `text` field
fn summary_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" }
        },
        "required": ["text"]
    })
}

/// Clamp a transcript to the model input limit, marking the cut
fn clamp_transcript(transcript: &str) -> Cow<'_, str> {
    let clamped = truncate_with_marker(transcript, MAX_TRANSCRIPT_CHARS);
    if matches!(clamped, Cow::Owned(_)) {
        tracing::warn!("Transcript truncated to {} characters", MAX_TRANSCRIPT_CHARS);
    }
    clamped
}

/// Parse the structured JSON reply into the summary text
fn parse_summary_payload(text: &str) -> Result<String, SheetScribeError> {
    let payload: SummaryPayload = serde_json::from_str(text)
        .map_err(|e| SheetScribeError::Summarize(format!("unexpected response schema: {}", e)))?;
    Ok(payload.text)
}
