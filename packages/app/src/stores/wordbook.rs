//! 单词本
//!
//! 以规范化单词为键的词条表。收词的释义抓取在锁外进行，写回时再次
//! 检查键是否已被并发插入：是则并入例句，不是才插入新词条，保证同一
//! 单词永远只有一条记录。

use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

use yuedu_algo::{
    review_batch, study_batch, validate_candidate, SentenceRef, WordEntry, WordStatus,
};

use crate::services::{DefinitionSources, ResolvedDefinition};
use crate::storage::{ProfileStorage, StorageResult};

/// 收词结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// 新词条已创建，携带规范化后的单词。
    Added(String),
    /// 单词已存在，例句并入既有词条。
    SentenceAppended(String),
    /// 未入本：候选无效、停用词，或例句重复。
    Skipped,
}

impl AddOutcome {
    /// 规范化后的单词（仅当确实写入了单词本）。
    pub fn word(&self) -> Option<&str> {
        match self {
            AddOutcome::Added(word) | AddOutcome::SentenceAppended(word) => Some(word),
            AddOutcome::Skipped => None,
        }
    }
}

#[derive(Default)]
pub struct WordbookStore {
    entries: RwLock<HashMap<String, WordEntry>>,
}

impl WordbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.read().contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<WordEntry> {
        self.entries.read().get(word).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 全量快照，按加入日期再按单词排序，保证持久化文件稳定。
    pub fn snapshot(&self) -> Vec<WordEntry> {
        let mut entries: Vec<WordEntry> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.added.cmp(&b.added).then_with(|| a.word.cmp(&b.word)));
        entries
    }

    /// 收录一个单词。候选先过规范化与停用词检查；通过后在锁外解析
    /// 释义，写回时若发现词条已被并发创建则退化为并入例句。
    pub async fn add_word(
        &self,
        raw: &str,
        sentence: SentenceRef,
        sources: &DefinitionSources,
        today: NaiveDate,
    ) -> AddOutcome {
        let word = match validate_candidate(raw) {
            Some(word) => word,
            None => {
                debug!(candidate = raw, "word candidate rejected");
                return AddOutcome::Skipped;
            }
        };

        if self.contains(&word) {
            return self.append_sentence(&word, sentence);
        }

        // 锁外抓释义：网络往返期间别的任务可能插入同一个词。
        let resolved = sources.resolve(&word).await;
        self.upsert_resolved(word, resolved, sentence, today)
    }

    /// 释义抓取后的写回。赢得竞争者插入新词条；输家把刚抓到的释义和
    /// 音标覆盖上去（后写胜出），例句照常去重并入。
    fn upsert_resolved(
        &self,
        word: String,
        resolved: ResolvedDefinition,
        sentence: SentenceRef,
        today: NaiveDate,
    ) -> AddOutcome {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(&word) {
            entry.definition = resolved.definition;
            entry.phonetics = resolved.phonetics;
            let duplicate = entry
                .sentences
                .iter()
                .any(|s| s.doc_id == sentence.doc_id && s.text == sentence.text);
            if duplicate {
                return AddOutcome::Skipped;
            }
            entry.sentences.push(sentence);
            return AddOutcome::SentenceAppended(word);
        }

        let entry = WordEntry::new(word.clone(), resolved.definition, sentence, today)
            .with_phonetics(resolved.phonetics);
        entries.insert(word.clone(), entry);
        info!(%word, "word added to wordbook");
        AddOutcome::Added(word)
    }

    /// 收录一个短语（多词选区）。不做规范化，用固定的占位释义并打上
    /// `phrase` 标签；重复收录退化为并入例句。
    pub fn add_phrase(&self, text: &str, sentence: SentenceRef, today: NaiveDate) -> AddOutcome {
        let phrase = text.trim();
        if phrase.is_empty() {
            return AddOutcome::Skipped;
        }

        let mut entries = self.entries.write();
        if entries.contains_key(phrase) {
            drop(entries);
            return self.append_sentence(phrase, sentence);
        }

        let definition = format!("Added phrase: \"{phrase}\"");
        let entry = WordEntry::new(phrase.to_string(), definition, sentence, today)
            .with_tags(vec!["phrase".to_string()]);
        entries.insert(phrase.to_string(), entry);
        info!(phrase, "phrase added to wordbook");
        AddOutcome::Added(phrase.to_string())
    }

    fn append_sentence(&self, word: &str, sentence: SentenceRef) -> AddOutcome {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(word) else {
            return AddOutcome::Skipped;
        };
        let duplicate = entry
            .sentences
            .iter()
            .any(|s| s.doc_id == sentence.doc_id && s.text == sentence.text);
        if duplicate {
            return AddOutcome::Skipped;
        }
        entry.sentences.push(sentence);
        AddOutcome::SentenceAppended(word.to_string())
    }

    /// 删除一个词条。不存在时返回 false。
    pub fn remove_word(&self, word: &str) -> bool {
        self.entries.write().remove(word).is_some()
    }

    /// 删除某文档贡献的所有例句；例句因此归零的词条整个移除，返回
    /// 被移除的单词列表。
    pub fn remove_sentences_for_document(&self, doc_id: &str) -> Vec<String> {
        let mut entries = self.entries.write();
        let mut removed = Vec::new();
        entries.retain(|word, entry| {
            entry.sentences.retain(|s| s.doc_id != doc_id);
            if entry.sentences.is_empty() {
                removed.push(word.clone());
                false
            } else {
                true
            }
        });
        removed.sort();
        if !removed.is_empty() {
            info!(doc_id, count = removed.len(), "entries orphaned by document removal");
        }
        removed
    }

    /// 记一次复习结果：答对追加 1，答错追加 0。
    pub fn record_review(&self, word: &str, correct: bool) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(word) {
            Some(entry) => {
                entry.record_review(correct);
                true
            }
            None => false,
        }
    }

    pub fn update_status(&self, word: &str, status: WordStatus) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(word) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    pub fn update_notes(&self, word: &str, notes: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(word) {
            Some(entry) => {
                entry.notes = notes.to_string();
                true
            }
            None => false,
        }
    }

    // ========== 批次选取 ==========

    pub fn study_batch(&self) -> Vec<WordEntry> {
        study_batch(&self.snapshot())
    }

    pub fn review_batch(&self, today: NaiveDate) -> Vec<WordEntry> {
        review_batch(&self.snapshot(), today)
    }

    // ========== 持久化 ==========

    pub fn load_from(&self, storage: &ProfileStorage) {
        let entries = storage.wordbook();
        debug!(count = entries.len(), "loaded wordbook");
        *self.entries.write() = entries
            .into_iter()
            .map(|entry| (entry.word.clone(), entry))
            .collect();
    }

    pub fn save_to(&self, storage: &ProfileStorage) -> StorageResult<()> {
        storage.save_wordbook(&self.snapshot())
    }

    /// 整体替换（导入备份）。重复单词后者覆盖前者。
    pub fn replace_all(&self, entries: Vec<WordEntry>) {
        *self.entries.write() = entries
            .into_iter()
            .map(|entry| (entry.word.clone(), entry))
            .collect();
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
