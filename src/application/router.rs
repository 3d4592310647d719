//! 响应路由
//!
//! 按置信度在意图服务与生成式模型之间选择最终回复

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::history::ReplyResult;
use crate::infrastructure::activity::ActivityLog;
use crate::infrastructure::intent::IntentService;
use crate::infrastructure::llm::GenerativeService;

/// 两个服务均失败时的固定道歉语
pub const APOLOGY_REPLY: &str =
    "I apologize, but I'm having trouble processing your request right now.";

/// 响应路由器
///
/// 每条消息先走意图识别；调用失败或置信度不足时降级到生成式模型，
/// 再失败则返回固定道歉语。任何分支都不重试，也不改写会话历史。
#[derive(Clone)]
pub struct ResponseRouter {
    intent: Arc<dyn IntentService>,
    generative: Arc<dyn GenerativeService>,
    confidence_threshold: f32,
    activity: Arc<ActivityLog>,
}

impl ResponseRouter {
    /// 创建路由器
    pub fn new(
        intent: Arc<dyn IntentService>,
        generative: Arc<dyn GenerativeService>,
        confidence_threshold: f32,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            intent,
            generative,
            confidence_threshold,
            activity,
        }
    }

    /// 路由一条消息，返回最终回复
    ///
    /// 空字符串原样转发，不做校验
    pub async fn route(&self, text: &str) -> ReplyResult {
        match self.intent.detect(text).await {
            Ok(outcome) => {
                self.activity.external_call(
                    "dialogflow",
                    serde_json::json!({
                        "intent": outcome.intent.as_str(),
                        "confidence": outcome.confidence,
                    }),
                );

                if outcome.confidence >= self.confidence_threshold {
                    info!(
                        intent = %outcome.intent,
                        confidence = outcome.confidence,
                        "using intent service response"
                    );
                    return ReplyResult::Intent {
                        reply: outcome.fulfillment,
                        intent: outcome.intent,
                        confidence: outcome.confidence,
                    };
                }

                info!(
                    confidence = outcome.confidence,
                    threshold = self.confidence_threshold,
                    "confidence below threshold, falling back to generative model"
                );
            }
            Err(e) => {
                // 意图服务失败对用户不可见，直接降级
                warn!("intent service call failed: {}", e);
                self.activity.external_error("dialogflow", &e.to_string());
            }
        }

        self.generate_fallback(text).await
    }

    /// 生成式降级分支；失败为请求终态
    async fn generate_fallback(&self, text: &str) -> ReplyResult {
        match self.generative.generate(text).await {
            Ok(generated) => {
                info!(model = %generated.model, "using generative model response");
                self.activity.external_call(
                    "openrouter",
                    serde_json::json!({ "model": generated.model.as_str() }),
                );
                ReplyResult::Generative {
                    reply: generated.reply,
                    model: generated.model,
                }
            }
            Err(e) => {
                warn!("generative service call failed: {}", e);
                self.activity.external_error("openrouter", &e.to_string());
                ReplyResult::Failed {
                    reply: APOLOGY_REPLY.to_string(),
                }
            }
        }
    }
}
