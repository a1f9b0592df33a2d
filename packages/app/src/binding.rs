//! 阅读视图与单词本的联动
//!
//! 点词的完整链路：候选校验 → 高亮翻转 → 入本 → 文档缓存登记。
//! 取消高亮不动词条；只有显式的“遗忘”才把单词从单词本、高亮集合和
//! 所有文档缓存里一起清掉。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use yuedu_algo::{validate_candidate, SentenceRef};

use crate::services::DefinitionSources;
use crate::stores::{AddOutcome, DocumentStore, HighlightStore, WordbookStore};

/// 点词的结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// 单词进入高亮态，附带收词结果。
    Highlighted(AddOutcome),
    /// 单词退出高亮态。词条保留在单词本里。
    Unhighlighted,
    /// 候选无效（太短、非字母、停用词），什么都没发生。
    Ignored,
}

pub struct ReaderBinding {
    highlights: Arc<HighlightStore>,
    wordbook: Arc<WordbookStore>,
    documents: Arc<DocumentStore>,
    sources: Arc<DefinitionSources>,
}

impl ReaderBinding {
    pub fn new(
        highlights: Arc<HighlightStore>,
        wordbook: Arc<WordbookStore>,
        documents: Arc<DocumentStore>,
        sources: Arc<DefinitionSources>,
    ) -> Self {
        Self {
            highlights,
            wordbook,
            documents,
            sources,
        }
    }

    /// 打开文档时把它缓存过的单词重新点亮（幂等）。
    pub fn open_document(&self, doc_id: &str) {
        let Some(document) = self.documents.get(doc_id) else {
            debug!(doc_id, "open_document on unknown document");
            return;
        };
        for word in &document.words {
            self.highlights.highlight(word);
        }
    }

    /// 在文档里点了一个单词。高亮翻转；新点亮的单词收进单词本并记入
    /// 文档缓存，取消点亮只改高亮态。
    pub async fn tap_word(
        &self,
        doc_id: &str,
        raw: &str,
        sentence_text: &str,
        today: NaiveDate,
    ) -> TapOutcome {
        let Some(word) = validate_candidate(raw) else {
            return TapOutcome::Ignored;
        };

        if !self.highlights.toggle(&word) {
            return TapOutcome::Unhighlighted;
        }

        let sentence = SentenceRef {
            doc_id: doc_id.to_string(),
            text: sentence_text.to_string(),
        };
        let outcome = self
            .wordbook
            .add_word(&word, sentence, &self.sources, today)
            .await;
        if outcome.word().is_some() {
            self.documents.add_word_to_document(doc_id, &word);
        }
        TapOutcome::Highlighted(outcome)
    }

    /// 多词选区直接入本为短语，不参与高亮。
    pub fn capture_phrase(
        &self,
        doc_id: &str,
        text: &str,
        sentence_text: &str,
        today: NaiveDate,
    ) -> AddOutcome {
        let sentence = SentenceRef {
            doc_id: doc_id.to_string(),
            text: sentence_text.to_string(),
        };
        self.wordbook.add_phrase(text, sentence, today)
    }

    /// 显式遗忘：词条、高亮、文档缓存一起清。
    pub fn forget_word(&self, word: &str) -> bool {
        let removed = self.wordbook.remove_word(word);
        self.highlights.unhighlight(word);
        self.documents.remove_word_from_all(word);
        removed
    }
}
