//! Common Types and Constants
//!
//! Shared data structures for word entries and batch selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Minimum length of a normalized word accepted into the wordbook
pub const MIN_WORD_LEN: usize = 2;

/// Maximum number of entries in a study batch
pub const STUDY_BATCH_SIZE: usize = 10;

/// Maximum number of entries in a review batch
pub const REVIEW_BATCH_SIZE: usize = 10;

/// Difficulty assigned to freshly captured words (1-5 scale)
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// History marker recorded for a correct/seen outcome
pub const HISTORY_CORRECT: i32 = 1;

/// History marker recorded for a forgotten outcome
pub const HISTORY_INCORRECT: i32 = 0;

// ==================== Word Entry ====================

/// Learning status of a wordbook entry.
///
/// Transitions happen only through explicit update calls or the
/// "mastered" answer inside a review session; nothing infers them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    #[default]
    NotStudied,
    Reviewing,
    Completed,
    Mastered,
}

impl WordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStudied => "not_studied",
            Self::Reviewing => "reviewing",
            Self::Completed => "completed",
            Self::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_studied" => Some(Self::NotStudied),
            "reviewing" => Some(Self::Reviewing),
            "completed" => Some(Self::Completed),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// One pronunciation variant, usually with an audio URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub audio: String,
}

/// A sentence context in which a word was captured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentenceRef {
    #[serde(rename = "docId")]
    pub doc_id: String,
    #[serde(default)]
    pub text: String,
}

/// One wordbook record, keyed by its normalized `word`.
///
/// An entry exists if and only if at least one sentence references it;
/// removing the last sentence removes the entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(rename = "def", default)]
    pub definition: String,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub sentences: Vec<SentenceRef>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub added: NaiveDate,
    #[serde(default)]
    pub history: Vec<i32>,
    #[serde(default)]
    pub status: WordStatus,
}

fn default_difficulty() -> u8 {
    DEFAULT_DIFFICULTY
}

impl WordEntry {
    /// Builds a freshly captured entry: `status = not_studied`, seeded
    /// `history = [1]`, default difficulty.
    pub fn new(word: String, definition: String, sentence: SentenceRef, added: NaiveDate) -> Self {
        Self {
            word,
            definition,
            phonetics: Vec::new(),
            sentences: vec![sentence],
            notes: String::new(),
            tags: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
            added,
            history: vec![HISTORY_CORRECT],
            status: WordStatus::NotStudied,
        }
    }

    pub fn with_phonetics(mut self, phonetics: Vec<Phonetic>) -> Self {
        self.phonetics = phonetics;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// 追加一次复习结果：答对记 1，答错记 0。
    pub fn record_review(&mut self, correct: bool) {
        self.history.push(if correct {
            HISTORY_CORRECT
        } else {
            HISTORY_INCORRECT
        });
    }
}
