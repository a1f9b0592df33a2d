//! # yuedu-algo - 阅读工具核心算法库
//!
//! 本 crate 提供纯 Rust 实现的单词本核心逻辑:
//!
//! - **Sanitize** - 单词规范化与停用词过滤
//! - **Review** - 学习/复习批次选择与保留度评分
//! - **Session** - 复习会话状态机
//!
//! ## 设计理念
//!
//! - **纯 Rust** - 无 I/O 依赖，可在任何 Rust 项目中使用
//! - **可复用** - 核心算法与存储/网络代码分离
//! - **充分测试** - 所有算法都有完整的单元测试
//!
//! ## 模块结构
//!
//! - [`sanitize`] - 单词规范化 (小写、剥离非字母、停用词)
//! - [`review`] - 批次选择 (FIFO 学习批次、保留度排序复习批次)
//! - [`session`] - 会话状态机 (InProgress -> Complete)
//! - [`types`] - 公共类型和常量

pub mod review;
pub mod sanitize;
pub mod session;
pub mod types;

pub use types::*;

pub use sanitize::{is_stop_word, normalize_word, validate_candidate};

pub use review::{retention_score, review_batch, study_batch};

pub use session::{Answer, ReviewSession, SessionKind, SessionPhase, SessionSummary};
