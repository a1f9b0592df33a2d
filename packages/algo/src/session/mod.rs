//! Review Session State Machine
//!
//! A session walks a pre-selected batch of words one at a time and
//! buckets the caller's answers into correct/incorrect lists. The
//! machine itself is pure; applying answer side effects to the wordbook
//! (history markers, mastered status) is the coordinator's job.

use serde::{Deserialize, Serialize};

use crate::types::WordEntry;

/// Which selector fed the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Study,
    Review,
}

/// An explicit caller answer for the current word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    /// "remember" - counts as correct
    Remember,
    /// "don't remember" - counts as incorrect
    Forget,
    /// "mastered now" - counts as correct and marks the word mastered
    Mastered,
}

impl Answer {
    pub fn is_correct(&self) -> bool {
        !matches!(self, Answer::Forget)
    }
}

/// Where the session currently stands. A session that does not exist
/// yet is the implicit `Idle` state; construction moves straight to
/// `InProgress` (or `Complete` for an empty batch).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Complete,
}

/// Correct/incorrect buckets surfaced once a session completes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
}

/// One in-flight study or review session.
#[derive(Debug)]
pub struct ReviewSession {
    kind: SessionKind,
    words: Vec<WordEntry>,
    current_index: usize,
    correct: Vec<String>,
    incorrect: Vec<String>,
    phase: SessionPhase,
}

impl ReviewSession {
    pub fn new(kind: SessionKind, words: Vec<WordEntry>) -> Self {
        let phase = if words.is_empty() {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress
        };
        Self {
            kind,
            words,
            current_index: 0,
            correct: Vec::new(),
            incorrect: Vec::new(),
            phase,
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The word awaiting an answer, `None` once complete.
    pub fn current(&self) -> Option<&WordEntry> {
        if self.phase == SessionPhase::Complete {
            return None;
        }
        self.words.get(self.current_index)
    }

    /// 0-based position of the current word.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Records an answer for the current word and advances. Returns the
    /// answered word, or `None` if the session was already complete (a
    /// completed session accepts no further mutation).
    pub fn answer(&mut self, answer: Answer) -> Option<String> {
        let word = self.current()?.word.clone();
        if answer.is_correct() {
            self.correct.push(word.clone());
        } else {
            self.incorrect.push(word.clone());
        }
        self.current_index += 1;
        if self.current_index >= self.words.len() {
            self.phase = SessionPhase::Complete;
        }
        Some(word)
    }

    /// Final buckets, available only once the session is complete.
    pub fn summary(&self) -> Option<SessionSummary> {
        if self.phase != SessionPhase::Complete {
            return None;
        }
        Some(SessionSummary {
            correct: self.correct.clone(),
            incorrect: self.incorrect.clone(),
        })
    }
}
