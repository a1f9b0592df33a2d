//! 本地档案存储模块
//!
//! localStorage 风格的本地持久化：每个集合一个 JSON 文件，整体读写。
//! 支持：
//! - 文档、单词本、设置、高亮状态的本地持久化
//! - 全量导出/导入（备份包）
//! - 清空档案
//!
//! Reads degrade to the empty collection (a fresh profile and a corrupt
//! file look the same to the caller, minus a warning); writes surface
//! their errors so in-memory state and disk never silently diverge.
//! Each call opens, reads or writes, and closes — no handle or lock is
//! held across calls.

pub mod models;

pub use models::{BackupBundle, Document, Settings, SettingsError};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use yuedu_algo::WordEntry;

const DOCUMENTS_FILE: &str = "documents.json";
const WORDBOOK_FILE: &str = "wordbook.json";
const SETTINGS_FILE: &str = "settings.json";
const HIGHLIGHTS_FILE: &str = "highlights.json";

/// 存储模块错误类型
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// 档案存储：一个目录，每个集合一个 JSON 文件。
#[derive(Debug)]
pub struct ProfileStorage {
    root: PathBuf,
}

impl ProfileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whole-collection read. A missing file is a fresh profile; a
    /// corrupt one is logged and treated the same rather than blocking
    /// startup.
    fn read_collection<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = name, "collection file not present yet");
                return T::default();
            }
            Err(err) => {
                warn!(file = name, %err, "failed to read collection, using empty default");
                return T::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(file = name, %err, "failed to parse collection, using empty default");
                T::default()
            }
        }
    }

    /// Whole-collection write via temp file + rename so a crash mid-write
    /// never leaves a truncated collection behind.
    fn write_collection<T: Serialize>(&self, name: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.file_path(&format!("{name}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.file_path(name))?;
        Ok(())
    }

    // ========== 集合访问 ==========

    pub fn documents(&self) -> Vec<Document> {
        self.read_collection(DOCUMENTS_FILE)
    }

    pub fn save_documents(&self, documents: &[Document]) -> StorageResult<()> {
        self.write_collection(DOCUMENTS_FILE, &documents)
    }

    pub fn wordbook(&self) -> Vec<WordEntry> {
        self.read_collection(WORDBOOK_FILE)
    }

    pub fn save_wordbook(&self, wordbook: &[WordEntry]) -> StorageResult<()> {
        self.write_collection(WORDBOOK_FILE, &wordbook)
    }

    pub fn settings(&self) -> Settings {
        self.read_collection(SETTINGS_FILE)
    }

    pub fn save_settings(&self, settings: &Settings) -> StorageResult<()> {
        self.write_collection(SETTINGS_FILE, settings)
    }

    pub fn highlights(&self) -> Vec<String> {
        self.read_collection(HIGHLIGHTS_FILE)
    }

    pub fn save_highlights(&self, highlights: &[String]) -> StorageResult<()> {
        self.write_collection(HIGHLIGHTS_FILE, &highlights)
    }

    // ========== 备份 ==========

    pub fn export_bundle(&self) -> BackupBundle {
        BackupBundle {
            documents: self.documents(),
            wordbook: self.wordbook(),
            settings: self.settings(),
            highlights: self.highlights(),
            exported_at: Utc::now(),
        }
    }

    pub fn import_bundle(&self, bundle: &BackupBundle) -> StorageResult<()> {
        self.save_documents(&bundle.documents)?;
        self.save_wordbook(&bundle.wordbook)?;
        self.save_settings(&bundle.settings)?;
        self.save_highlights(&bundle.highlights)?;
        Ok(())
    }

    /// 清空档案（删除所有集合文件）。
    pub fn clear_all(&self) -> StorageResult<()> {
        for name in [DOCUMENTS_FILE, WORDBOOK_FILE, SETTINGS_FILE, HIGHLIGHTS_FILE] {
            match fs::remove_file(self.file_path(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use yuedu_algo::SentenceRef;

    fn temp_storage() -> (tempfile::TempDir, ProfileStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = ProfileStorage::new(dir.path()).expect("storage");
        (dir, storage)
    }

    fn sample_entry(word: &str) -> WordEntry {
        WordEntry::new(
            word.to_string(),
            "a definition".to_string(),
            SentenceRef {
                doc_id: "doc-1".to_string(),
                text: "some sentence".to_string(),
            },
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
    }

    #[test]
    fn test_fresh_profile_reads_empty() {
        let (_dir, storage) = temp_storage();
        assert!(storage.documents().is_empty());
        assert!(storage.wordbook().is_empty());
        assert!(storage.highlights().is_empty());
        assert_eq!(storage.settings(), Settings::default());
    }

    #[test]
    fn test_wordbook_round_trip() {
        let (_dir, storage) = temp_storage();
        let entries = vec![sample_entry("cat"), sample_entry("dog")];
        storage.save_wordbook(&entries).unwrap();
        assert_eq!(storage.wordbook(), entries);
    }

    #[test]
    fn test_corrupt_collection_degrades_to_empty() {
        let (_dir, storage) = temp_storage();
        std::fs::write(storage.root().join(WORDBOOK_FILE), b"{not json").unwrap();
        assert!(storage.wordbook().is_empty());
    }

    #[test]
    fn test_bundle_export_import() {
        let (_dir, storage) = temp_storage();
        storage.save_wordbook(&[sample_entry("cat")]).unwrap();
        storage
            .save_highlights(&["cat".to_string(), "dog".to_string()])
            .unwrap();

        let bundle = storage.export_bundle();

        let (_dir2, other) = temp_storage();
        other.import_bundle(&bundle).unwrap();
        assert_eq!(other.wordbook(), storage.wordbook());
        assert_eq!(other.highlights(), storage.highlights());
    }

    #[test]
    fn test_clear_all() {
        let (_dir, storage) = temp_storage();
        storage.save_wordbook(&[sample_entry("cat")]).unwrap();
        storage.clear_all().unwrap();
        assert!(storage.wordbook().is_empty());
        // Clearing an already-empty profile is fine too.
        storage.clear_all().unwrap();
    }
}
