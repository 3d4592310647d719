//! 意图识别客户端
//!
//! 调用 Dialogflow 风格的 detectIntent REST 接口

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::INTENT_LANGUAGE_CODE;
use crate::errors::{ParlanceError, Result};

/// 意图识别结果
#[derive(Debug, Clone, PartialEq)]
pub struct IntentOutcome {
    /// 意图名称
    pub intent: String,
    /// 应答文本
    pub fulfillment: String,
    /// 置信度，取值 [0, 1]
    pub confidence: f32,
}

/// 意图识别服务接口
#[async_trait]
pub trait IntentService: Send + Sync {
    /// 识别文本意图
    async fn detect(&self, text: &str) -> Result<IntentOutcome>;
}

// ==================== 请求/响应类型 ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest {
    query_input: QueryInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryInput {
    text: TextInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    text: String,
    language_code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    query_result: QueryResult,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct QueryResult {
    fulfillment_text: String,
    intent: IntentInfo,
    intent_detection_confidence: f32,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct IntentInfo {
    display_name: String,
}

// ==================== 客户端 ====================

/// 意图识别客户端
#[derive(Clone)]
pub struct IntentClient {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    session_id: String,
    token: String,
}

impl IntentClient {
    /// 从凭证文件创建客户端
    ///
    /// 凭证文件内容为 Bearer token，启动时读取一次
    pub fn from_credentials_file(
        endpoint: impl Into<String>,
        credentials_path: impl AsRef<Path>,
        project_id: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let token = std::fs::read_to_string(credentials_path.as_ref())
            .map_err(|e| {
                ParlanceError::ConfigError(format!(
                    "cannot read intent credentials {}: {}",
                    credentials_path.as_ref().display(),
                    e
                ))
            })?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(ParlanceError::ConfigError(
                "intent credentials file is empty".to_string(),
            ));
        }

        Self::new(endpoint, token, project_id, session_id, timeout)
    }

    /// 使用现成 token 创建客户端
    ///
    /// 超时作用于整个出站请求；构建失败时报错而不是退回无超时客户端
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        project_id: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            session_id: session_id.into(),
            token: token.into(),
        })
    }

    fn detect_intent_url(&self) -> String {
        format!(
            "{}/v2/projects/{}/agent/sessions/{}:detectIntent",
            self.endpoint, self.project_id, self.session_id
        )
    }
}

#[async_trait]
impl IntentService for IntentClient {
    async fn detect(&self, text: &str) -> Result<IntentOutcome> {
        let request = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: text.to_string(),
                    language_code: INTENT_LANGUAGE_CODE.to_string(),
                },
            },
        };

        debug!("sending detectIntent request to {}", self.endpoint);

        let response = self
            .client
            .post(self.detect_intent_url())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParlanceError::IntentError(format!(
                "detectIntent returned status {}: {}",
                status, body
            )));
        }

        let parsed: DetectIntentResponse = response
            .json()
            .await
            .map_err(|e| ParlanceError::IntentError(format!("malformed response: {}", e)))?;

        debug!(
            confidence = parsed.query_result.intent_detection_confidence,
            intent = %parsed.query_result.intent.display_name,
            "intent detected"
        );

        Ok(IntentOutcome {
            intent: parsed.query_result.intent.display_name,
            fulfillment: parsed.query_result.fulfillment_text,
            confidence: parsed.query_result.intent_detection_confidence,
        })
    }
}

/// 未配置的意图服务
///
/// 凭证缺失时的占位实现，每次调用都失败，由路由器降级处理
pub struct UnconfiguredIntent;

#[async_trait]
impl IntentService for UnconfiguredIntent {
    async fn detect(&self, _text: &str) -> Result<IntentOutcome> {
        Err(ParlanceError::IntentError(
            "intent service is not configured".to_string(),
        ))
    }
}
