//! 文档库
//!
//! 导入的阅读材料，按创建时间排列。每个文档带一个从中收录过的单词
//! 缓存，删除文档时据此反推需要清理的高亮与词条。

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::{Document, ProfileStorage, StorageResult};

#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().iter().find(|d| d.id == id).cloned()
    }

    /// 按创建时间升序的全量快照。
    pub fn list(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    pub fn add_document(&self, title: &str, content: &str) -> Document {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let document = Document {
            id: format!("doc-{}-{}", now.timestamp_millis(), &suffix[..8]),
            title: title.trim().to_string(),
            content: content.to_string(),
            words: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        info!(id = %document.id, title = %document.title, "document imported");
        self.documents.write().push(document.clone());
        document
    }

    /// 删除文档，返回被删的文档（便于上层做级联清理）。
    pub fn remove_document(&self, id: &str) -> Option<Document> {
        let mut documents = self.documents.write();
        let index = documents.iter().position(|d| d.id == id)?;
        let removed = documents.remove(index);
        info!(%id, "document removed");
        Some(removed)
    }

    /// 把一个收录过的单词记进文档缓存。重复记录静默无操作。
    pub fn add_word_to_document(&self, doc_id: &str, word: &str) -> bool {
        let mut documents = self.documents.write();
        let Some(document) = documents.iter_mut().find(|d| d.id == doc_id) else {
            return false;
        };
        if !document.words.iter().any(|w| w == word) {
            document.words.push(word.to_string());
            document.updated_at = Utc::now();
        }
        true
    }

    pub fn remove_word_from_document(&self, doc_id: &str, word: &str) -> bool {
        let mut documents = self.documents.write();
        let Some(document) = documents.iter_mut().find(|d| d.id == doc_id) else {
            return false;
        };
        let before = document.words.len();
        document.words.retain(|w| w != word);
        if document.words.len() != before {
            document.updated_at = Utc::now();
        }
        true
    }

    /// 从所有文档缓存里抹掉一个单词（整词遗忘时用）。
    pub fn remove_word_from_all(&self, word: &str) {
        let mut documents = self.documents.write();
        for document in documents.iter_mut() {
            let before = document.words.len();
            document.words.retain(|w| w != word);
            if document.words.len() != before {
                document.updated_at = Utc::now();
            }
        }
    }

    // ========== 持久化 ==========

    pub fn load_from(&self, storage: &ProfileStorage) {
        let documents = storage.documents();
        debug!(count = documents.len(), "loaded documents");
        *self.documents.write() = documents;
    }

    pub fn save_to(&self, storage: &ProfileStorage) -> StorageResult<()> {
        storage.save_documents(&self.documents.read())
    }

    pub fn replace_all(&self, documents: Vec<Document>) {
        *self.documents.write() = documents;
    }

    pub fn clear(&self) {
        self.documents.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let store = DocumentStore::new();
        let doc = store.add_document("  My Article ", "The cat sat.");
        assert!(doc.id.starts_with("doc-"));
        assert_eq!(doc.title, "My Article");
        assert_eq!(store.get(&doc.id).unwrap().content, "The cat sat.");
        assert!(store.get("doc-unknown").is_none());
    }

    #[test]
    fn test_word_cache_dedupes() {
        let store = DocumentStore::new();
        let doc = store.add_document("t", "c");
        assert!(store.add_word_to_document(&doc.id, "cat"));
        assert!(store.add_word_to_document(&doc.id, "cat"));
        assert_eq!(store.get(&doc.id).unwrap().words, vec!["cat".to_string()]);

        assert!(store.remove_word_from_document(&doc.id, "cat"));
        assert!(store.get(&doc.id).unwrap().words.is_empty());

        assert!(!store.add_word_to_document("doc-unknown", "cat"));
    }

    #[test]
    fn test_remove_returns_document() {
        let store = DocumentStore::new();
        let doc = store.add_document("t", "c");
        let removed = store.remove_document(&doc.id).unwrap();
        assert_eq!(removed.id, doc.id);
        assert!(store.is_empty());
        assert!(store.remove_document(&doc.id).is_none());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProfileStorage::new(dir.path()).unwrap();

        let store = DocumentStore::new();
        store.add_document("a", "x");
        store.add_document("b", "y");
        store.save_to(&storage).unwrap();

        let restored = DocumentStore::new();
        restored.load_from(&storage);
        assert_eq!(restored.list(), store.list());
    }
}
