//! 外部服务客户端：词典查询与 AI 助手。

pub mod ai;
pub mod dictionary;

pub use ai::{AiError, Assistant, AssistantConfig, Provider};
pub use dictionary::{Definition, DictionaryClient, DictionaryError, DEFAULT_DICTIONARY_BASE_URL};

use tokio::sync::Mutex;
use tracing::debug;

use yuedu_algo::Phonetic;

/// 查词结果：释义文本加可选的音标列表。
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedDefinition {
    pub definition: String,
    pub phonetics: Vec<Phonetic>,
}

/// 释义来源链：词典优先，AI 兜底，二者都拿不到时给占位释义。
///
/// 两个来源都是可选的，`disabled()` 构造一个纯占位的实例，离线或测试
/// 场景下一次网络请求都不会发出。
pub struct DefinitionSources {
    dictionary: Option<DictionaryClient>,
    assistant: Option<Mutex<Assistant>>,
}

impl DefinitionSources {
    pub fn new(dictionary: Option<DictionaryClient>, assistant: Option<Assistant>) -> Self {
        Self {
            dictionary,
            assistant: assistant.map(Mutex::new),
        }
    }

    /// 不查任何外部来源，总是返回占位释义。
    pub fn disabled() -> Self {
        Self {
            dictionary: None,
            assistant: None,
        }
    }

    /// Resolution never fails: source errors downgrade to the next rung
    /// of the chain, and the placeholder is the floor.
    pub async fn resolve(&self, word: &str) -> ResolvedDefinition {
        if let Some(dictionary) = &self.dictionary {
            match dictionary.lookup(word).await {
                Ok(Some(found)) => {
                    if let Some(definition) = found.primary_definition() {
                        return ResolvedDefinition {
                            definition: definition.to_string(),
                            phonetics: found.phonetics,
                        };
                    }
                }
                Ok(None) => {}
                Err(err) => debug!(%word, %err, "dictionary lookup failed, trying next source"),
            }
        }

        if let Some(assistant) = &self.assistant {
            match assistant.lock().await.define_word(word).await {
                Ok(definition) if !definition.trim().is_empty() => {
                    return ResolvedDefinition {
                        definition: definition.trim().to_string(),
                        phonetics: Vec::new(),
                    };
                }
                Ok(_) => {}
                Err(err) => debug!(%word, %err, "assistant definition failed, using placeholder"),
            }
        }

        ResolvedDefinition {
            definition: placeholder_definition(word),
            phonetics: Vec::new(),
        }
    }
}

/// 词典与 AI 都不可用时写入词条的占位释义。
pub fn placeholder_definition(word: &str) -> String {
    format!("Word \"{word}\" - Definition will be updated when dictionary service is available.")
}
