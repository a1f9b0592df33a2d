//! 阅读生词应用核心
//!
//! 桌面阅读/生词工具的非界面部分：
//! - 文档库、单词本、高亮集合、设置四个仓库及其 JSON 档案持久化
//! - 点词收录链路（校验 → 高亮 → 释义解析 → 入本）
//! - 学习/复习会话协调
//! - 词典与多提供商 AI 释义来源
//!
//! 纯算法（候选校验、保持度评分、批次选取、会话状态机）在
//! `yuedu-algo`，这里只做 I/O 与编排。

pub mod binding;
pub mod config;
pub mod export;
pub mod logging;
pub mod review;
pub mod services;
pub mod state;
pub mod storage;
pub mod stores;

pub use binding::{ReaderBinding, TapOutcome};
pub use config::Config;
pub use review::ReviewCoordinator;
pub use services::{DefinitionSources, ResolvedDefinition};
pub use state::{AppError, AppResult, AppSession};
pub use storage::{BackupBundle, Document, ProfileStorage, Settings, StorageError};
pub use stores::{
    AddOutcome, DocumentStore, HighlightEvent, HighlightStore, SettingsStore, WordbookStore,
};
