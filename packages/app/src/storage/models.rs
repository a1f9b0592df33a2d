//! Persisted collection models: documents, settings, backup bundles.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use yuedu_algo::WordEntry;

use crate::services::dictionary::DEFAULT_DICTIONARY_BASE_URL;

/// One imported text document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Denormalized cache of normalized words captured from this
    /// document. Mirrors the wordbook's sentence references.
    #[serde(default)]
    pub words: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for setting `{key}`")]
    InvalidValue { key: String },
}

/// Flat settings map with defaulted fields. Unknown keys are preserved
/// round-trip in `extra` so older/newer profiles stay readable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(rename = "aiEnabled", default)]
    pub ai_enabled: bool,
    #[serde(rename = "aiProvider", default = "default_ai_provider")]
    pub ai_provider: String,
    #[serde(rename = "aiApiKey", default)]
    pub ai_api_key: String,
    #[serde(rename = "aiBaseURL", default)]
    pub ai_base_url: String,
    #[serde(rename = "aiModel", default)]
    pub ai_model: String,
    #[serde(rename = "dictionaryApiKey", default)]
    pub dictionary_api_key: String,
    #[serde(rename = "dictionaryBaseURL", default = "default_dictionary_base_url")]
    pub dictionary_base_url: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_accent() -> String {
    "us".to_string()
}

fn default_language() -> String {
    "zh-CN".to_string()
}

fn default_ai_provider() -> String {
    "openai".to_string()
}

fn default_dictionary_base_url() -> String {
    DEFAULT_DICTIONARY_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            accent: default_accent(),
            language: default_language(),
            ai_enabled: false,
            ai_provider: default_ai_provider(),
            ai_api_key: String::new(),
            ai_base_url: String::new(),
            ai_model: String::new(),
            dictionary_api_key: String::new(),
            dictionary_base_url: default_dictionary_base_url(),
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Applies one key at a time, the only mutation path the UI has.
    /// Unknown keys are stored verbatim rather than rejected.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        match key {
            "theme" => self.theme = expect_string(key, value)?,
            "accent" => self.accent = expect_string(key, value)?,
            "language" => self.language = expect_string(key, value)?,
            "aiEnabled" => {
                self.ai_enabled = value
                    .as_bool()
                    .ok_or_else(|| SettingsError::InvalidValue { key: key.to_string() })?
            }
            "aiProvider" => self.ai_provider = expect_string(key, value)?,
            "aiApiKey" => self.ai_api_key = expect_string(key, value)?,
            "aiBaseURL" => self.ai_base_url = expect_string(key, value)?,
            "aiModel" => self.ai_model = expect_string(key, value)?,
            "dictionaryApiKey" => self.dictionary_api_key = expect_string(key, value)?,
            "dictionaryBaseURL" => self.dictionary_base_url = expect_string(key, value)?,
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

fn expect_string(key: &str, value: Value) -> Result<String, SettingsError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(SettingsError::InvalidValue { key: key.to_string() }),
    }
}

/// Full-profile export/import payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub wordbook: Vec<WordEntry>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub exported_at: DateTime<Utc>,
}
