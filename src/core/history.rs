//! 会话历史
//!
//! 追加式内存存储，进程生命周期内不丢弃、不淘汰

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// 回复来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplySource {
    /// 意图识别服务命中
    #[serde(rename = "intent-service")]
    IntentService,
    /// 生成式模型降级回复
    #[serde(rename = "generative-service")]
    GenerativeService,
    /// 两个服务均失败
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplySource::IntentService => write!(f, "intent-service"),
            ReplySource::GenerativeService => write!(f, "generative-service"),
            ReplySource::Error => write!(f, "error"),
        }
    }
}

/// 路由结果
///
/// 三种出口显式区分：命中意图、生成式降级、终态失败。
/// 路由器不抛出未处理错误，失败折叠为 `Failed`。
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyResult {
    /// 置信度达标，使用意图服务的应答文本
    Intent {
        reply: String,
        intent: String,
        confidence: f32,
    },
    /// 降级到生成式模型
    Generative { reply: String, model: String },
    /// 两个服务均失败，固定道歉语
    Failed { reply: String },
}

impl ReplyResult {
    /// 最终回复文本
    pub fn reply(&self) -> &str {
        match self {
            ReplyResult::Intent { reply, .. } => reply,
            ReplyResult::Generative { reply, .. } => reply,
            ReplyResult::Failed { reply } => reply,
        }
    }

    /// 回复来源标签
    pub fn source(&self) -> ReplySource {
        match self {
            ReplyResult::Intent { .. } => ReplySource::IntentService,
            ReplyResult::Generative { .. } => ReplySource::GenerativeService,
            ReplyResult::Failed { .. } => ReplySource::Error,
        }
    }
}

/// 单次交互记录
///
/// 创建后不可变，仅由会话历史持有
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// 记录时刻（UTC 墙钟）
    pub timestamp: DateTime<Utc>,
    /// HTML 转义后的用户输入
    pub user_input: String,
    /// 机器人回复
    pub bot_response: String,
    /// 回复来源
    pub source: ReplySource,
    /// 意图置信度（仅意图来源）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// 意图名称（仅意图来源）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// 模型标识（仅生成式来源）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Interaction {
    /// 从路由结果构建交互记录
    ///
    /// 用户输入在此处做 HTML 转义，供后续页面安全展示
    pub fn from_result(user_input: &str, result: &ReplyResult) -> Self {
        let (confidence, intent, model) = match result {
            ReplyResult::Intent {
                intent, confidence, ..
            } => (Some(*confidence), Some(intent.clone()), None),
            ReplyResult::Generative { model, .. } => (None, None, Some(model.clone())),
            ReplyResult::Failed { .. } => (None, None, None),
        };

        Self {
            timestamp: Utc::now(),
            user_input: escape_html(user_input),
            bot_response: result.reply().to_string(),
            source: result.source(),
            confidence,
            intent,
            model,
        }
    }
}

/// HTML 特殊字符转义
///
/// 转义 `&` `<` `>` `"` `'` 五个字符
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 会话历史接口
///
/// 可注入的存储抽象，测试可替换为独立实例
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 追加一条交互记录
    async fn append(&self, interaction: Interaction) -> Result<()>;

    /// 返回全部记录（按插入顺序）
    async fn snapshot(&self) -> Result<Vec<Interaction>>;

    /// 记录条数
    async fn len(&self) -> usize;

    /// 是否为空
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 构建记录、追加并返回
    ///
    /// 纯追加，无错误条件（内存实现的 `append` 不会失败）
    async fn record(&self, user_input: &str, result: &ReplyResult) -> Interaction {
        let interaction = Interaction::from_result(user_input, result);
        if let Err(e) = self.append(interaction.clone()).await {
            // 内存实现不会走到这里，保留日志以防其他实现
            tracing::error!("failed to append interaction: {}", e);
        }
        interaction
    }
}

/// 内存会话历史
///
/// 默认实现，数据仅在内存中，重启后丢失。
/// 追加受写锁保护，并发请求下长度单调递增。
pub struct MemoryHistory {
    interactions: RwLock<Vec<Interaction>>,
}

impl MemoryHistory {
    /// 创建新的内存历史
    pub fn new() -> Self {
        Self {
            interactions: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, interaction: Interaction) -> Result<()> {
        let mut interactions = self.interactions.write().await;
        interactions.push(interaction);
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<Interaction>> {
        let interactions = self.interactions.read().await;
        Ok(interactions.clone())
    }

    async fn len(&self) -> usize {
        let interactions = self.interactions.read().await;
        interactions.len()
    }
}
