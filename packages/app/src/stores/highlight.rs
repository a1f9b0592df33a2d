//! 高亮单词集合
//!
//! 阅读界面的高亮状态：一个去重的单词集合，加一个同步监听器注册表。
//! 每个操作都先把入参规范化（小写、剥离非字母），规范化后为空的词
//! 静默丢弃，保证集合里只存在规范形。写操作先落集合，通知时对监听器
//! 列表做快照后再回调，回调里可以安全地读写本仓库。

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use yuedu_algo::normalize_word;

use crate::storage::{ProfileStorage, StorageResult};

/// 高亮集合的变更通知。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightEvent {
    Added(String),
    Removed(String),
    /// 整体替换（载入档案、导入备份、清空），携带替换后的集合。
    Reset(Vec<String>),
}

/// 退订凭据，由 [`HighlightStore::subscribe`] 返回。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&HighlightEvent) + Send + Sync>;

#[derive(Default)]
pub struct HighlightStore {
    words: Mutex<HashSet<String>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_highlighted(&self, word: &str) -> bool {
        let word = normalize_word(word);
        !word.is_empty() && self.words.lock().contains(&word)
    }

    pub fn len(&self) -> usize {
        self.words.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.lock().is_empty()
    }

    /// 当前高亮集合的快照，排序后返回，便于持久化与测试比对。
    pub fn snapshot(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.lock().iter().cloned().collect();
        words.sort();
        words
    }

    /// 加入高亮。已高亮或规范化后为空时静默无操作，不发事件。
    pub fn highlight(&self, word: &str) {
        let word = normalize_word(word);
        if word.is_empty() {
            return;
        }
        let inserted = self.words.lock().insert(word.clone());
        if inserted {
            self.notify(&HighlightEvent::Added(word));
        }
    }

    /// 移除高亮。未高亮或规范化后为空时静默无操作，不发事件。
    pub fn unhighlight(&self, word: &str) {
        let word = normalize_word(word);
        if word.is_empty() {
            return;
        }
        let removed = self.words.lock().remove(&word);
        if removed {
            self.notify(&HighlightEvent::Removed(word));
        }
    }

    /// 翻转一个单词的高亮状态，返回翻转后是否处于高亮。规范化后为空
    /// 的词不翻转，返回 false。
    pub fn toggle(&self, word: &str) -> bool {
        let word = normalize_word(word);
        if word.is_empty() {
            return false;
        }
        let (now_highlighted, event) = {
            let mut words = self.words.lock();
            if words.remove(&word) {
                (false, HighlightEvent::Removed(word))
            } else {
                words.insert(word.clone());
                (true, HighlightEvent::Added(word))
            }
        };
        self.notify(&event);
        now_highlighted
    }

    /// 整体替换集合内容。每个词先规范化，空结果丢弃；发一次携带新
    /// 集合的 `Reset`。
    pub fn replace_all<I>(&self, words: I)
    where
        I: IntoIterator<Item = String>,
    {
        *self.words.lock() = words
            .into_iter()
            .map(|w| normalize_word(&w))
            .filter(|w| !w.is_empty())
            .collect();
        self.notify(&HighlightEvent::Reset(self.snapshot()));
    }

    pub fn clear(&self) {
        self.words.lock().clear();
        self.notify(&HighlightEvent::Reset(Vec::new()));
    }

    /// 注册一个同步监听器。回调在触发变更的调用方线程上执行。
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&HighlightEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// 退订。重复退订静默无操作。
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id.0);
    }

    /// 对注册表做快照后在锁外回调，监听器里再订阅/退订不会自锁。
    fn notify(&self, event: &HighlightEvent) {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    // ========== 持久化 ==========

    /// 从档案载入集合。走 [`replace_all`](Self::replace_all)，历史档案
    /// 里的未规范化词在这里被修正。
    pub fn load_from(&self, storage: &ProfileStorage) {
        let words = storage.highlights();
        debug!(count = words.len(), "loaded highlight set");
        self.replace_all(words);
    }

    pub fn save_to(&self, storage: &ProfileStorage) -> StorageResult<()> {
        storage.save_highlights(&self.snapshot())
    }
}
