//! 学习/复习会话协调器
//!
//! 纯状态机（[`ReviewSession`]）走批次，这里负责把每个回答落到单词本
//! 上：答对答错写进历史，“已掌握”额外改状态。同一时刻最多一个会话。

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::info;

use yuedu_algo::{
    Answer, ReviewSession, SessionKind, SessionPhase, SessionSummary, WordEntry, WordStatus,
};

use crate::stores::WordbookStore;

pub struct ReviewCoordinator {
    wordbook: Arc<WordbookStore>,
    session: Mutex<Option<ReviewSession>>,
}

impl ReviewCoordinator {
    pub fn new(wordbook: Arc<WordbookStore>) -> Self {
        Self {
            wordbook,
            session: Mutex::new(None),
        }
    }

    /// 开始学习会话：未学过的词按加入顺序取一批。返回批次大小。
    pub fn start_study(&self) -> usize {
        let batch = self.wordbook.study_batch();
        self.start(SessionKind::Study, batch)
    }

    /// 开始复习会话：按保持度从低到高取一批。返回批次大小。
    pub fn start_review(&self, today: NaiveDate) -> usize {
        let batch = self.wordbook.review_batch(today);
        self.start(SessionKind::Review, batch)
    }

    fn start(&self, kind: SessionKind, batch: Vec<WordEntry>) -> usize {
        let size = batch.len();
        info!(kind = ?kind, size, "session started");
        *self.session.lock() = Some(ReviewSession::new(kind, batch));
        size
    }

    /// 当前待答的词。没有会话或会话已结束时为 `None`。
    pub fn current_word(&self) -> Option<WordEntry> {
        self.session
            .lock()
            .as_ref()
            .and_then(|s| s.current().cloned())
    }

    pub fn phase(&self) -> Option<SessionPhase> {
        self.session.lock().as_ref().map(|s| s.phase())
    }

    /// 回答当前词并推进会话。返回被回答的词；没有可答的词时为 `None`，
    /// 单词本不会被改动。
    pub fn answer(&self, answer: Answer) -> Option<String> {
        let word = {
            let mut session = self.session.lock();
            session.as_mut()?.answer(answer)?
        };

        self.wordbook.record_review(&word, answer.is_correct());
        if answer == Answer::Mastered {
            self.wordbook.update_status(&word, WordStatus::Mastered);
        }
        Some(word)
    }

    /// 会话结束后的对错汇总。
    pub fn summary(&self) -> Option<SessionSummary> {
        self.session.lock().as_ref().and_then(|s| s.summary())
    }

    /// 丢弃当前会话。已答部分的历史保留。
    pub fn abandon(&self) {
        *self.session.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DefinitionSources;
    use yuedu_algo::SentenceRef;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn seeded_wordbook(words: &[&str]) -> Arc<WordbookStore> {
        let store = Arc::new(WordbookStore::new());
        let sources = DefinitionSources::disabled();
        for word in words {
            store
                .add_word(
                    word,
                    SentenceRef {
                        doc_id: "doc-1".to_string(),
                        text: format!("sentence with {word}"),
                    },
                    &sources,
                    today(),
                )
                .await;
        }
        store
    }

    #[tokio::test]
    async fn test_study_session_applies_answers() {
        let wordbook = seeded_wordbook(&["cat", "dog", "owl"]).await;
        let coordinator = ReviewCoordinator::new(Arc::clone(&wordbook));

        assert_eq!(coordinator.start_study(), 3);
        assert_eq!(coordinator.answer(Answer::Remember), Some("cat".to_string()));
        assert_eq!(coordinator.answer(Answer::Forget), Some("dog".to_string()));
        assert_eq!(coordinator.answer(Answer::Mastered), Some("owl".to_string()));
        assert_eq!(coordinator.phase(), Some(SessionPhase::Complete));

        assert_eq!(wordbook.get("cat").unwrap().history, vec![1, 1]);
        assert_eq!(wordbook.get("dog").unwrap().history, vec![1, 0]);
        let owl = wordbook.get("owl").unwrap();
        assert_eq!(owl.history, vec![1, 1]);
        assert_eq!(owl.status, WordStatus::Mastered);

        let summary = coordinator.summary().unwrap();
        assert_eq!(summary.correct, vec!["cat", "owl"]);
        assert_eq!(summary.incorrect, vec!["dog"]);
    }

    #[tokio::test]
    async fn test_answer_without_session_is_noop() {
        let wordbook = seeded_wordbook(&["cat"]).await;
        let coordinator = ReviewCoordinator::new(Arc::clone(&wordbook));

        assert_eq!(coordinator.answer(Answer::Remember), None);
        assert_eq!(wordbook.get("cat").unwrap().history, vec![1]);
    }

    #[tokio::test]
    async fn test_completed_session_stops_mutating() {
        let wordbook = seeded_wordbook(&["cat"]).await;
        let coordinator = ReviewCoordinator::new(Arc::clone(&wordbook));

        coordinator.start_study();
        coordinator.answer(Answer::Remember);
        assert_eq!(coordinator.answer(Answer::Remember), None);
        assert_eq!(wordbook.get("cat").unwrap().history, vec![1, 1]);
    }

    #[tokio::test]
    async fn test_review_excludes_mastered() {
        let wordbook = seeded_wordbook(&["cat", "dog"]).await;
        wordbook.update_status("cat", WordStatus::Mastered);

        let coordinator = ReviewCoordinator::new(Arc::clone(&wordbook));
        assert_eq!(coordinator.start_review(today()), 1);
        assert_eq!(coordinator.current_word().unwrap().word, "dog");
    }

    #[tokio::test]
    async fn test_abandon_keeps_partial_history() {
        let wordbook = seeded_wordbook(&["cat", "dog"]).await;
        let coordinator = ReviewCoordinator::new(Arc::clone(&wordbook));

        coordinator.start_study();
        coordinator.answer(Answer::Forget);
        coordinator.abandon();

        assert!(coordinator.phase().is_none());
        assert_eq!(wordbook.get("cat").unwrap().history, vec![1, 0]);
        assert_eq!(wordbook.get("dog").unwrap().history, vec![1]);
    }
}
