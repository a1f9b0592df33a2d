//! 内存状态仓库：高亮集合、单词本、文档库、设置。
//!
//! 仓库只管内存状态与变更规则，何时落盘由上层会话决定。

pub mod documents;
pub mod highlight;
pub mod settings;
pub mod wordbook;

pub use documents::DocumentStore;
pub use highlight::{HighlightEvent, HighlightStore, SubscriptionId};
pub use settings::SettingsStore;
pub use wordbook::{AddOutcome, WordbookStore};
