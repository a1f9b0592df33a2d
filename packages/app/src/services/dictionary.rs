//! Free-dictionary lookup client.
//!
//! `GET <base>/<word>` against a dictionaryapi.dev-compatible endpoint.
//! A miss (non-2xx, empty array, undecodable body) is `Ok(None)`, never
//! a hard error - word capture falls back to the AI assistant and then
//! to a placeholder.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use yuedu_algo::{normalize_word, Phonetic};

pub const DEFAULT_DICTIONARY_BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One reshaped dictionary result.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub word: String,
    pub phonetics: Vec<Phonetic>,
    pub meanings: Vec<Meaning>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<Sense>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sense {
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

impl Definition {
    /// First definition of the first meaning, the one shown inline.
    pub fn primary_definition(&self) -> Option<&str> {
        self.meanings
            .first()
            .and_then(|m| m.definitions.first())
            .map(|d| d.definition.as_str())
            .filter(|d| !d.is_empty())
    }
}

#[derive(Clone)]
pub struct DictionaryClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl DictionaryClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    /// Looks a word up. `Ok(None)` covers every "no definition" shape:
    /// empty normalization, non-2xx status, empty array, bad JSON.
    pub async fn lookup(&self, word: &str) -> Result<Option<Definition>, DictionaryError> {
        let word = normalize_word(word);
        if word.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), word);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            debug!(word = %word, status = %response.status(), "dictionary miss");
            return Ok(None);
        }

        let entries: Vec<RawEntry> = match response.json().await {
            Ok(entries) => entries,
            Err(err) => {
                debug!(word = %word, %err, "undecodable dictionary response");
                return Ok(None);
            }
        };

        Ok(entries.into_iter().next().map(|entry| reshape(entry, &word)))
    }
}

fn reshape(entry: RawEntry, fallback_word: &str) -> Definition {
    let phonetics = entry
        .phonetics
        .into_iter()
        .filter_map(|p| {
            let audio = p.audio.unwrap_or_default();
            if audio.is_empty() {
                return None;
            }
            Some(Phonetic {
                text: p.text.unwrap_or_default(),
                audio,
            })
        })
        .collect();

    let meanings = entry
        .meanings
        .into_iter()
        .map(|m| Meaning {
            part_of_speech: m.part_of_speech.unwrap_or_default(),
            definitions: m
                .definitions
                .into_iter()
                .map(|d| Sense {
                    definition: d.definition.unwrap_or_default(),
                    example: d.example,
                    synonyms: d.synonyms,
                    antonyms: d.antonyms,
                })
                .collect(),
            synonyms: m.synonyms,
            antonyms: m.antonyms,
        })
        .collect();

    Definition {
        word: entry.word.unwrap_or_else(|| fallback_word.to_string()),
        phonetics,
        meanings,
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    word: Option<String>,
    #[serde(default)]
    phonetics: Vec<RawPhonetic>,
    #[serde(default)]
    meanings: Vec<RawMeaning>,
}

#[derive(Debug, Deserialize)]
struct RawPhonetic {
    text: Option<String>,
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMeaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<RawSense>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSense {
    definition: Option<String>,
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}
