//! LLM 客户端
//!
//! 使用 async-openai 对接 OpenRouter（OpenAI 兼容接口）

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::debug;

use crate::core::config::OPENROUTER_API_BASE;
use crate::errors::{ParlanceError, Result};

/// 固定系统提示词
const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, concise, and accurate responses.";

/// 生成式回复
#[derive(Debug, Clone, PartialEq)]
pub struct GenerativeReply {
    /// 回复文本
    pub reply: String,
    /// 实际应答的模型标识（来自 API 响应）
    pub model: String,
}

/// 生成式模型服务接口
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// 为输入文本生成自由回复
    async fn generate(&self, text: &str) -> Result<GenerativeReply>;
}

/// OpenRouter 客户端
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenRouterClient {
    /// 创建新的 OpenRouter 客户端
    ///
    /// 密钥缺失时客户端仍可构建，调用 `generate` 会立即返回错误
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::new_with_base_url(api_key, model, OPENROUTER_API_BASE.to_string())
    }

    /// 指定端点创建客户端
    pub fn new_with_base_url(api_key: Option<String>, model: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = api_key.map(|key| {
            let config = OpenAIConfig::new()
                .with_api_key(key)
                .with_api_base(base_url);
            Client::with_config(config)
        });

        Self { client, model }
    }

    /// 配置的模型名
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeService for OpenRouterClient {
    async fn generate(&self, text: &str) -> Result<GenerativeReply> {
        let client = self.client.as_ref().ok_or_else(|| {
            ParlanceError::LlmError("OpenRouter API key not configured".to_string())
        })?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map(ChatCompletionRequestMessage::System)
                .map_err(|e| ParlanceError::LlmError(e.to_string()))?,
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map(ChatCompletionRequestMessage::User)
                .map_err(|e| ParlanceError::LlmError(e.to_string()))?,
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| ParlanceError::LlmError(e.to_string()))?;

        debug!(model = %self.model, "sending chat completion request");

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| ParlanceError::LlmError(e.to_string()))?;

        let model = response.model.clone();
        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(GenerativeReply { reply, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new(
            Some("sk-or-test".to_string()),
            "mistralai/mistral-7b-instruct".to_string(),
        );

        assert_eq!(client.model(), "mistralai/mistral-7b-instruct");
        assert!(client.client.is_some());
    }

    #[test]
    fn test_client_without_key() {
        let client = OpenRouterClient::new(None, "mistralai/mistral-7b-instruct".to_string());
        assert!(client.client.is_none());
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_fast() {
        let client = OpenRouterClient::new(None, "mistralai/mistral-7b-instruct".to_string());
        let result = client.generate("hello").await;

        match result {
            Err(ParlanceError::LlmError(msg)) => {
                assert!(msg.contains("not configured"));
            }
            other => panic!("expected LlmError, got {:?}", other),
        }
    }
}
