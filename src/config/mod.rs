use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SheetScribeError;

/// Environment variables the loader recognizes
const ENV_SUPADATA_API_KEY: &str = "SUPADATA_API_KEY";
const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const ENV_GOOGLE_CREDENTIALS: &str = "GOOGLE_CREDENTIALS";
const ENV_SPREADSHEET_ID: &str = "SHEETSCRIBE_SPREADSHEET_ID";
const ENV_WORKSHEET: &str = "SHEETSCRIBE_WORKSHEET";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Google Sheets settings
    pub sheets: SheetsConfig,

    /// Supadata transcription settings
    pub supadata: SupadataConfig,

    /// Gemini settings
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Spreadsheet ID, as found in the sheet's URL
    pub spreadsheet_id: String,

    /// Worksheet (tab) title
    pub worksheet: String,

    /// Inline service-account JSON. When unset, gcp_auth falls back to
    /// GOOGLE_APPLICATION_CREDENTIALS. Never written to the config file.
    #[serde(skip)]
    pub credentials_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupadataConfig {
    /// API endpoint
    pub base_url: String,

    /// Preferred transcript language hint
    pub language: String,

    /// API key, environment only
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model used for summarization
    pub model: String,

    /// API key, environment only
    #[serde(skip)]
    pub api_key: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: "Sheet1".to_string(),
            credentials_json: None,
        }
    }
}

impl Default for SupadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.supadata.ai/v1".to_string(),
            language: "en".to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from file (when present) and the environment.
    ///
    /// The YAML file holds non-secret settings; API keys and credentials are
    /// read from the environment only and override file values.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs_err::read_to_string(&path).context("Failed to read config file")?;
                serde_yaml::from_str(&content).context("Failed to parse config file")?
            }
            _ => Self::default(),
        };

        config.apply_env();
        config.validate()?;

        tracing::info!("Configuration loaded and validated");
        Ok(config)
    }

    /// Config file search order: ./sheetscribe.yaml first, then the user
    /// config directory.
    pub fn config_path() -> Option<PathBuf> {
        let local = PathBuf::from("sheetscribe.yaml");
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir().map(|dir| dir.join("sheetscribe").join("config.yaml"))
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(ENV_SPREADSHEET_ID) {
            self.sheets.spreadsheet_id = value;
        }
        if let Ok(value) = std::env::var(ENV_WORKSHEET) {
            self.sheets.worksheet = value;
        }
        self.sheets.credentials_json = std::env::var(ENV_GOOGLE_CREDENTIALS)
            .ok()
            .filter(|value| !value.is_empty());
        if let Ok(value) = std::env::var(ENV_SUPADATA_API_KEY) {
            self.supadata.api_key = value;
        }
        if let Ok(value) = std::env::var(ENV_GEMINI_API_KEY) {
            self.gemini.api_key = value;
        }
    }

    /// Validate required settings, naming every missing key at once.
    fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.supadata.api_key.is_empty() {
            missing.push(ENV_SUPADATA_API_KEY);
        }
        if self.gemini.api_key.is_empty() {
            missing.push(ENV_GEMINI_API_KEY);
        }
        if self.sheets.spreadsheet_id.is_empty() {
            missing.push(ENV_SPREADSHEET_ID);
        }

        if !missing.is_empty() {
            return Err(SheetScribeError::Setup(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            ))
            .into());
        }

        Ok(())
    }

    /// Print the resolved configuration with secrets masked
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Spreadsheet ID: {}", self.sheets.spreadsheet_id);
        println!("  Worksheet: {}", self.sheets.worksheet);
        println!("  Supadata endpoint: {}", self.supadata.base_url);
        println!("  Preferred language: {}", self.supadata.language);
        println!("  Gemini model: {}", self.gemini.model);
        println!("  Supadata key: {}", mask(&self.supadata.api_key));
        println!("  Gemini key: {}", mask(&self.gemini.api_key));
        println!(
            "  Google credentials: {}",
            if self.sheets.credentials_json.is_some() {
                "inline JSON"
            } else {
                "GOOGLE_APPLICATION_CREDENTIALS"
            }
        );
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    if secret.chars().count() <= 8 {
        return "********".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}****", prefix)
}
