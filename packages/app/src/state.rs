//! 应用会话：组合根
//!
//! 打开档案目录，装载四个仓库，把释义来源、阅读联动、复习协调器接到
//! 一起。仓库本身只管内存，所有“改完就落盘”的策略集中在这里。

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use yuedu_algo::{Answer, WordEntry, WordStatus};

use crate::binding::{ReaderBinding, TapOutcome};
use crate::config::Config;
use crate::export::export_wordbook_csv;
use crate::review::ReviewCoordinator;
use crate::services::{Assistant, AssistantConfig, DefinitionSources, DictionaryClient};
use crate::storage::{
    BackupBundle, Document, ProfileStorage, Settings, SettingsError, StorageError,
};
use crate::stores::{AddOutcome, DocumentStore, HighlightStore, SettingsStore, WordbookStore};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type AppResult<T> = Result<T, AppError>;

pub struct AppSession {
    storage: ProfileStorage,
    highlights: Arc<HighlightStore>,
    wordbook: Arc<WordbookStore>,
    documents: Arc<DocumentStore>,
    settings: Arc<SettingsStore>,
    sources: RwLock<Arc<DefinitionSources>>,
    review: ReviewCoordinator,
}

impl AppSession {
    /// 打开（或初始化）一个档案目录，按已存设置装配外部服务。
    pub fn open(config: &Config) -> AppResult<Self> {
        let storage = ProfileStorage::new(&config.data_dir)?;
        let settings = Arc::new(SettingsStore::new());
        settings.load_from(&storage);

        let sources = build_sources(&settings.snapshot(), &config.dictionary_base_url);
        Self::assemble(storage, settings, sources)
    }

    /// 用指定的释义来源装配会话。测试与离线场景用
    /// [`DefinitionSources::disabled()`] 保证不触网。
    pub fn open_with_sources(config: &Config, sources: DefinitionSources) -> AppResult<Self> {
        let storage = ProfileStorage::new(&config.data_dir)?;
        let settings = Arc::new(SettingsStore::new());
        settings.load_from(&storage);
        Self::assemble(storage, settings, sources)
    }

    fn assemble(
        storage: ProfileStorage,
        settings: Arc<SettingsStore>,
        sources: DefinitionSources,
    ) -> AppResult<Self> {
        let highlights = Arc::new(HighlightStore::new());
        let wordbook = Arc::new(WordbookStore::new());
        let documents = Arc::new(DocumentStore::new());

        highlights.load_from(&storage);
        wordbook.load_from(&storage);
        documents.load_from(&storage);
        info!(
            documents = documents.len(),
            words = wordbook.len(),
            highlights = highlights.len(),
            "profile loaded"
        );

        let review = ReviewCoordinator::new(Arc::clone(&wordbook));
        Ok(Self {
            storage,
            highlights,
            wordbook,
            documents,
            settings,
            sources: RwLock::new(Arc::new(sources)),
            review,
        })
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn binding(&self) -> ReaderBinding {
        ReaderBinding::new(
            Arc::clone(&self.highlights),
            Arc::clone(&self.wordbook),
            Arc::clone(&self.documents),
            Arc::clone(&self.sources.read()),
        )
    }

    // ========== 文档 ==========

    pub fn documents(&self) -> Vec<Document> {
        self.documents.list()
    }

    pub fn import_document(&self, title: &str, content: &str) -> AppResult<Document> {
        let document = self.documents.add_document(title, content);
        self.documents.save_to(&self.storage)?;
        Ok(document)
    }

    pub fn open_document(&self, doc_id: &str) {
        self.binding().open_document(doc_id);
    }

    /// 删除文档并级联：该文档贡献的例句移除，例句归零的词条连同高亮
    /// 一起清掉。返回被移除的单词。
    pub fn delete_document(&self, doc_id: &str) -> AppResult<Vec<String>> {
        let Some(removed_doc) = self.documents.remove_document(doc_id) else {
            warn!(doc_id, "delete_document on unknown document");
            return Ok(Vec::new());
        };
        let orphaned = self.wordbook.remove_sentences_for_document(&removed_doc.id);
        for word in &orphaned {
            self.highlights.unhighlight(word);
        }

        self.documents.save_to(&self.storage)?;
        self.wordbook.save_to(&self.storage)?;
        self.highlights.save_to(&self.storage)?;
        Ok(orphaned)
    }

    // ========== 阅读联动 ==========

    pub async fn tap_word(
        &self,
        doc_id: &str,
        raw: &str,
        sentence_text: &str,
    ) -> AppResult<TapOutcome> {
        let outcome = self
            .binding()
            .tap_word(doc_id, raw, sentence_text, Self::today())
            .await;
        if outcome != TapOutcome::Ignored {
            self.wordbook.save_to(&self.storage)?;
            self.highlights.save_to(&self.storage)?;
            self.documents.save_to(&self.storage)?;
        }
        Ok(outcome)
    }

    pub fn capture_phrase(
        &self,
        doc_id: &str,
        text: &str,
        sentence_text: &str,
    ) -> AppResult<AddOutcome> {
        let outcome = self
            .binding()
            .capture_phrase(doc_id, text, sentence_text, Self::today());
        if outcome != AddOutcome::Skipped {
            self.wordbook.save_to(&self.storage)?;
        }
        Ok(outcome)
    }

    pub fn forget_word(&self, word: &str) -> AppResult<bool> {
        let removed = self.binding().forget_word(word);
        if removed {
            self.wordbook.save_to(&self.storage)?;
            self.highlights.save_to(&self.storage)?;
            self.documents.save_to(&self.storage)?;
        }
        Ok(removed)
    }

    pub fn is_highlighted(&self, word: &str) -> bool {
        self.highlights.is_highlighted(word)
    }

    // ========== 单词本 ==========

    pub fn wordbook_entries(&self) -> Vec<WordEntry> {
        self.wordbook.snapshot()
    }

    pub fn word_entry(&self, word: &str) -> Option<WordEntry> {
        self.wordbook.get(word)
    }

    pub fn update_word_status(&self, word: &str, status: WordStatus) -> AppResult<bool> {
        let updated = self.wordbook.update_status(word, status);
        if updated {
            self.wordbook.save_to(&self.storage)?;
        }
        Ok(updated)
    }

    pub fn update_word_notes(&self, word: &str, notes: &str) -> AppResult<bool> {
        let updated = self.wordbook.update_notes(word, notes);
        if updated {
            self.wordbook.save_to(&self.storage)?;
        }
        Ok(updated)
    }

    pub fn export_wordbook_csv<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        export_wordbook_csv(&self.wordbook.snapshot(), path)?;
        Ok(())
    }

    // ========== 学习/复习 ==========

    pub fn start_study(&self) -> usize {
        self.review.start_study()
    }

    pub fn start_review(&self) -> usize {
        self.review.start_review(Self::today())
    }

    pub fn current_review_word(&self) -> Option<WordEntry> {
        self.review.current_word()
    }

    /// 回答当前词并立即把历史落盘。
    pub fn answer_review(&self, answer: Answer) -> AppResult<Option<String>> {
        let word = self.review.answer(answer);
        if word.is_some() {
            self.wordbook.save_to(&self.storage)?;
        }
        Ok(word)
    }

    pub fn review_summary(&self) -> Option<yuedu_algo::SessionSummary> {
        self.review.summary()
    }

    // ========== 设置 ==========

    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    /// 改一项设置并落盘。AI / 词典相关的键改动后立即重建释义来源。
    pub fn update_setting(&self, key: &str, value: Value) -> AppResult<()> {
        self.settings.set(key, value)?;
        self.settings.save_to(&self.storage)?;
        if key.starts_with("ai") || key.starts_with("dictionary") {
            self.reload_sources();
        }
        Ok(())
    }

    fn reload_sources(&self) {
        let snapshot = self.settings.snapshot();
        let sources = build_sources(&snapshot, &snapshot.dictionary_base_url);
        *self.sources.write() = Arc::new(sources);
        info!("definition sources reconfigured");
    }

    // ========== 备份 ==========

    pub fn export_backup(&self) -> BackupBundle {
        BackupBundle {
            documents: self.documents.list(),
            wordbook: self.wordbook.snapshot(),
            settings: self.settings.snapshot(),
            highlights: self.highlights.snapshot(),
            exported_at: chrono::Utc::now(),
        }
    }

    pub fn import_backup(&self, bundle: BackupBundle) -> AppResult<()> {
        self.documents.replace_all(bundle.documents);
        self.wordbook.replace_all(bundle.wordbook);
        self.settings.replace_all(bundle.settings);
        self.highlights.replace_all(bundle.highlights);

        self.documents.save_to(&self.storage)?;
        self.wordbook.save_to(&self.storage)?;
        self.settings.save_to(&self.storage)?;
        self.highlights.save_to(&self.storage)?;
        self.reload_sources();
        Ok(())
    }

    /// 清空档案：内存与磁盘一起清。
    pub fn clear_profile(&self) -> AppResult<()> {
        self.documents.clear();
        self.wordbook.clear();
        self.settings.reset();
        self.highlights.clear();
        self.review.abandon();
        self.storage.clear_all()?;
        Ok(())
    }

    pub fn highlight_store(&self) -> &Arc<HighlightStore> {
        &self.highlights
    }
}

/// 按当前设置装配释义来源：词典总是可用（有默认端点），AI 只有在
/// 启用且配置了密钥时才接入。
fn build_sources(settings: &Settings, fallback_dictionary_url: &str) -> DefinitionSources {
    let dictionary_url = if settings.dictionary_base_url.trim().is_empty() {
        fallback_dictionary_url
    } else {
        &settings.dictionary_base_url
    };
    let api_key = (!settings.dictionary_api_key.trim().is_empty())
        .then(|| settings.dictionary_api_key.clone());
    let dictionary = DictionaryClient::new(dictionary_url, api_key);

    let assistant = if settings.ai_enabled && !settings.ai_api_key.trim().is_empty() {
        Some(Assistant::new(AssistantConfig::new(
            &settings.ai_provider,
            &settings.ai_api_key,
            &settings.ai_base_url,
            &settings.ai_model,
        )))
    } else {
        None
    };

    DefinitionSources::new(Some(dictionary), assistant)
}
