//! 多提供商 AI 助手客户端
//!
//! 统一封装 OpenAI / DeepSeek / Google / Anthropic / Moonshot /
//! OpenRouter / Qwen / Mistral / Llama 九家聊天接口：各家差异集中在
//! endpoint、headers、请求体和响应提取四个函数里。一次调用一次请求，
//! 失败直接按类别上报给调用方，不做自动重试。

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 保留的最近对话轮数（user + assistant 各算一条）。
const MAX_HISTORY_MESSAGES: usize = 10;

const MAX_OUTPUT_TOKENS: u32 = 2000;

const SYSTEM_MESSAGE: &str = r#"You are a helpful AI assistant for language learning and reading comprehension. Your role is to:

1. Help users understand text content and vocabulary
2. Provide clear, concise explanations
3. Offer examples and context when helpful
4. Support language learning with definitions, pronunciations, and usage
5. Answer questions about reading materials accurately

Please be friendly, educational, and supportive in your responses."#;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service not configured. Please set up API key in settings.")]
    NotConfigured,

    #[error("Invalid request. Please check your input.")]
    BadRequest,

    #[error("Authentication failed. Please check your API key.")]
    Unauthorized,

    #[error("Access forbidden. Please verify your API permissions.")]
    Forbidden,

    #[error("API endpoint not found. Please check your configuration.")]
    NotFound,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("The AI service is temporarily unavailable. Please try again later.")]
    Unavailable,

    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("Network error. Please check your internet connection.")]
    Network,

    #[error("HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid response structure from AI API.")]
    MalformedResponse,
}

impl AiError {
    fn from_status(status: u16, body: &Value) -> Self {
        match status {
            400 => AiError::BadRequest,
            401 => AiError::Unauthorized,
            403 => AiError::Forbidden,
            404 => AiError::NotFound,
            429 => AiError::RateLimited,
            500 | 502 | 503 => AiError::Unavailable,
            _ => {
                let message = body
                    .pointer("/error/message")
                    .or_else(|| body.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Request failed")
                    .to_string();
                AiError::Provider { status, message }
            }
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Network
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    DeepSeek,
    Google,
    Anthropic,
    Moonshot,
    OpenRouter,
    Qwen,
    Mistral,
    Llama,
}

impl Provider {
    /// 未知标识回落到 OpenAI，与设置界面的默认一致。
    pub fn from_id(id: &str) -> Self {
        match id {
            "deepseek" => Provider::DeepSeek,
            "google" => Provider::Google,
            "anthropic" => Provider::Anthropic,
            "moonshot" => Provider::Moonshot,
            "openrouter" => Provider::OpenRouter,
            "qwen" => Provider::Qwen,
            "mistral" => Provider::Mistral,
            "llama" => Provider::Llama,
            _ => Provider::OpenAi,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::Google => "google",
            Provider::Anthropic => "anthropic",
            Provider::Moonshot => "moonshot",
            Provider::OpenRouter => "openrouter",
            Provider::Qwen => "qwen",
            Provider::Mistral => "mistral",
            Provider::Llama => "llama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::Google => "https://generativelanguage.googleapis.com/v1beta",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Moonshot => "https://api.moonshot.cn/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Qwen => "https://dashscope.aliyuncs.com/api/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::Llama => "https://api.together.xyz/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "o3",
            Provider::DeepSeek => "deepseek-reasoner",
            Provider::Google => "gemini-2.5-pro",
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::Moonshot => "Kimi K2",
            Provider::OpenRouter => "openai/gpt-4-turbo",
            Provider::Qwen => "qwen3-235b-a22b",
            Provider::Mistral => "mistral-large-latest",
            Provider::Llama => "meta-llama/Llama-3-70b-chat-hf",
        }
    }

    fn endpoint(&self, model: &str) -> String {
        match self {
            Provider::Google => format!("/models/{model}:generateContent"),
            Provider::Anthropic => "/messages".to_string(),
            Provider::Qwen => "/services/aigc/text-generation/generation".to_string(),
            _ => "/chat/completions".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl AssistantConfig {
    /// 空 base_url / model 回落到提供商默认值。
    pub fn new(provider_id: &str, api_key: &str, base_url: &str, model: &str) -> Self {
        let provider = Provider::from_id(provider_id);
        let base_url = if base_url.trim().is_empty() {
            provider.default_base_url().to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };
        let model = if model.trim().is_empty() {
            provider.default_model().to_string()
        } else {
            model.trim().to_string()
        };
        Self {
            provider,
            api_key: api_key.trim().to_string(),
            base_url,
            model,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Clone, Debug)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// 有状态的聊天助手：持有配置与最近的对话历史。
pub struct Assistant {
    config: AssistantConfig,
    client: reqwest::Client,
    history: Vec<ChatMessage>,
}

impl Assistant {
    pub fn new(config: AssistantConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            client,
            history: Vec::new(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.config.provider
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// 带上下文的问答，计入对话历史。
    pub async fn ask(&mut self, message: &str, context: Option<&str>) -> Result<String, AiError> {
        self.send(message, context, true).await
    }

    /// 单词释义查询，不污染对话历史。
    pub async fn define_word(&mut self, word: &str) -> Result<String, AiError> {
        let prompt = format!(
            "Please provide a concise definition for the English word \"{word}\". \
             Return only the definition without extra explanation."
        );
        self.send(&prompt, None, false).await
    }

    /// 连通性测试：发一条固定问候，不写历史。
    pub async fn test_connection(&mut self) -> Result<String, AiError> {
        self.send(
            "Hello! Please respond with 'Connection test successful' to confirm the API is working.",
            None,
            false,
        )
        .await
    }

    async fn send(
        &mut self,
        message: &str,
        context: Option<&str>,
        use_history: bool,
    ) -> Result<String, AiError> {
        if !self.config.is_configured() {
            return Err(AiError::NotConfigured);
        }

        let user_message = match context {
            Some(ctx) => format!("Context: \"{ctx}\"\n\nQuestion: {message}"),
            None => message.to_string(),
        };

        let messages = self.build_messages(&user_message, use_history);
        let url = format!(
            "{}{}",
            self.config.base_url,
            self.config.provider.endpoint(&self.config.model)
        );
        let body = build_body(self.config.provider, &self.config.model, &messages);

        debug!(provider = self.config.provider.id(), model = %self.config.model, "sending chat request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        request = match self.config.provider {
            Provider::Google => request.header("X-goog-api-key", &self.config.api_key),
            Provider::Anthropic => request
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", "2023-06-01"),
            _ => request.bearer_auth(&self.config.api_key),
        };

        let response = request.json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let err = AiError::from_status(status.as_u16(), &body);
            error!(provider = self.config.provider.id(), %status, %err, "chat request failed");
            return Err(err);
        }

        let data: Value = response.json().await.map_err(AiError::from)?;
        let answer = extract_content(self.config.provider, &data)?;

        if use_history {
            self.push_history(user_message, answer.clone());
        }
        Ok(answer)
    }

    fn build_messages(&self, user_message: &str, use_history: bool) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: SYSTEM_MESSAGE.to_string(),
        }];
        if use_history && !self.history.is_empty() {
            let start = self.history.len().saturating_sub(MAX_HISTORY_MESSAGES);
            messages.extend(self.history[start..].iter().cloned());
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_message.to_string(),
        });
        messages
    }

    fn push_history(&mut self, user_message: String, answer: String) {
        self.history.push(ChatMessage {
            role: "user",
            content: user_message,
        });
        self.history.push(ChatMessage {
            role: "assistant",
            content: answer,
        });
        let cap = MAX_HISTORY_MESSAGES * 2;
        if self.history.len() > cap {
            self.history.drain(..self.history.len() - cap);
        }
    }
}

fn messages_json(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect()
}

fn build_body(provider: Provider, model: &str, messages: &[ChatMessage]) -> Value {
    match provider {
        Provider::Google => {
            // Gemini 没有独立的消息数组，系统提示与对话拼成一段文本。
            let system = messages
                .iter()
                .find(|m| m.role == "system")
                .map(|m| m.content.as_str())
                .unwrap_or_default();
            let conversation = messages
                .iter()
                .filter(|m| m.role != "system")
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n\n");
            json!({
                "contents": [{ "parts": [{ "text": format!("{system}\n\n{conversation}") }] }],
                "generationConfig": {
                    "maxOutputTokens": MAX_OUTPUT_TOKENS,
                    "temperature": 0.7,
                    "topP": 0.8,
                    "topK": 40,
                },
            })
        }
        Provider::Anthropic => {
            let system = messages
                .iter()
                .find(|m| m.role == "system")
                .map(|m| m.content.as_str())
                .unwrap_or_default();
            let conversation: Vec<Value> = messages
                .iter()
                .filter(|m| m.role != "system")
                .map(|m| json!({ "role": m.role, "content": m.content }))
                .collect();
            json!({
                "model": model,
                "max_tokens": MAX_OUTPUT_TOKENS,
                "temperature": 0.7,
                "system": system,
                "messages": conversation,
            })
        }
        Provider::Qwen => json!({
            "model": model,
            "input": { "messages": messages_json(messages) },
            "parameters": {
                "max_tokens": MAX_OUTPUT_TOKENS,
                "temperature": 0.7,
                "top_p": 0.8,
            },
        }),
        _ => json!({
            "model": model,
            "messages": messages_json(messages),
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": 0.7,
            "top_p": 0.9,
            "frequency_penalty": 0.1,
            "presence_penalty": 0.1,
        }),
    }
}

fn extract_content(provider: Provider, data: &Value) -> Result<String, AiError> {
    let pointer = match provider {
        Provider::Google => "/candidates/0/content/parts/0/text",
        Provider::Anthropic => "/content/0/text",
        Provider::Qwen => "/output/text",
        _ => "/choices/0/message/content",
    };
    data.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AiError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> AssistantConfig {
        AssistantConfig::new(provider, "key", "", "")
    }

    #[test]
    fn test_provider_defaults_fill_blank_fields() {
        let cfg = config("anthropic");
        assert_eq!(cfg.provider, Provider::Anthropic);
        assert_eq!(cfg.base_url, "https://api.anthropic.com/v1");
        assert_eq!(cfg.model, "claude-sonnet-4-20250514");

        let cfg = AssistantConfig::new("deepseek", "key", "https://proxy.local/v1/", "custom");
        assert_eq!(cfg.base_url, "https://proxy.local/v1");
        assert_eq!(cfg.model, "custom");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_openai() {
        assert_eq!(Provider::from_id("carrier-pigeon"), Provider::OpenAi);
    }

    #[test]
    fn test_endpoints_per_provider() {
        assert_eq!(
            Provider::Google.endpoint("gemini-2.5-pro"),
            "/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(Provider::Anthropic.endpoint("x"), "/messages");
        assert_eq!(
            Provider::Qwen.endpoint("x"),
            "/services/aigc/text-generation/generation"
        );
        assert_eq!(Provider::Mistral.endpoint("x"), "/chat/completions");
    }

    #[test]
    fn test_body_shapes() {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: "sys".to_string(),
            },
            ChatMessage {
                role: "user",
                content: "hi".to_string(),
            },
        ];

        let openai = build_body(Provider::OpenAi, "o3", &messages);
        assert_eq!(openai["model"], "o3");
        assert_eq!(openai["messages"].as_array().unwrap().len(), 2);

        let anthropic = build_body(Provider::Anthropic, "claude", &messages);
        assert_eq!(anthropic["system"], "sys");
        assert_eq!(anthropic["messages"].as_array().unwrap().len(), 1);

        let google = build_body(Provider::Google, "gemini", &messages);
        let text = google["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("sys"));
        assert!(text.contains("user: hi"));

        let qwen = build_body(Provider::Qwen, "qwen3-8b", &messages);
        assert_eq!(qwen["input"]["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_content_paths() {
        let openai = json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(extract_content(Provider::OpenAi, &openai).unwrap(), "hello");

        let anthropic = json!({"content": [{"type": "text", "text": "hi"}]});
        assert_eq!(extract_content(Provider::Anthropic, &anthropic).unwrap(), "hi");

        let google = json!({"candidates": [{"content": {"parts": [{"text": "g"}]}}]});
        assert_eq!(extract_content(Provider::Google, &google).unwrap(), "g");

        let qwen = json!({"output": {"text": "q"}});
        assert_eq!(extract_content(Provider::Qwen, &qwen).unwrap(), "q");

        assert!(matches!(
            extract_content(Provider::OpenAi, &json!({})),
            Err(AiError::MalformedResponse)
        ));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(AiError::from_status(401, &Value::Null), AiError::Unauthorized));
        assert!(matches!(AiError::from_status(429, &Value::Null), AiError::RateLimited));
        assert!(matches!(AiError::from_status(503, &Value::Null), AiError::Unavailable));
        let body = json!({"error": {"message": "odd failure"}});
        match AiError::from_status(418, &body) {
            AiError::Provider { status, message } => {
                assert_eq!(status, 418);
                assert_eq!(message, "odd failure");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_history_is_capped() {
        let mut assistant = Assistant::new(config("openai"));
        for i in 0..30 {
            assistant.push_history(format!("q{i}"), format!("a{i}"));
        }
        assert_eq!(assistant.history_len(), MAX_HISTORY_MESSAGES * 2);
        assert_eq!(assistant.history[0].content, "q20");
    }

    #[test]
    fn test_unconfigured_assistant_refuses() {
        let mut assistant = Assistant::new(AssistantConfig::new("openai", "", "", ""));
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt.block_on(assistant.ask("hello", None)).unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }
}
