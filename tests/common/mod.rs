//! 测试辅助：可编程的意图/生成式服务替身与测试服务器

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Duration;

use parlance::application::router::ResponseRouter;
use parlance::core::history::MemoryHistory;
use parlance::errors::{ParlanceError, Result};
use parlance::infrastructure::activity::ActivityLog;
use parlance::infrastructure::intent::{IntentOutcome, IntentService};
use parlance::infrastructure::llm::{GenerativeReply, GenerativeService};
use parlance::infrastructure::web::{create_router, AppState};

/// 预设行为的意图服务替身
pub struct MockIntent {
    outcome: Option<IntentOutcome>,
    pub calls: AtomicUsize,
}

impl MockIntent {
    /// 总是成功，返回给定意图与置信度
    pub fn succeeding(intent: &str, fulfillment: &str, confidence: f32) -> Self {
        Self {
            outcome: Some(IntentOutcome {
                intent: intent.to_string(),
                fulfillment: fulfillment.to_string(),
                confidence,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// 总是失败
    pub fn failing() -> Self {
        Self {
            outcome: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentService for MockIntent {
    async fn detect(&self, _text: &str) -> Result<IntentOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(ParlanceError::IntentError(
                "mock intent failure".to_string(),
            )),
        }
    }
}

/// 预设行为的生成式服务替身
pub struct MockGenerative {
    reply: Option<GenerativeReply>,
    pub calls: AtomicUsize,
}

impl MockGenerative {
    pub fn succeeding(reply: &str, model: &str) -> Self {
        Self {
            reply: Some(GenerativeReply {
                reply: reply.to_string(),
                model: model.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeService for MockGenerative {
    async fn generate(&self, _text: &str) -> Result<GenerativeReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ParlanceError::LlmError("mock generative failure".to_string())),
        }
    }
}

/// 创建写入临时目录的活动日志
///
/// 返回的 TempDir 需保持存活，否则目录被提前清理
pub fn temp_activity() -> (tempfile::TempDir, Arc<ActivityLog>) {
    let dir = tempfile::tempdir().unwrap();
    let activity = Arc::new(ActivityLog::new(dir.path()));
    (dir, activity)
}

/// 用给定替身构建路由器
pub fn test_router(
    intent: Arc<dyn IntentService>,
    generative: Arc<dyn GenerativeService>,
    threshold: f32,
    activity: Arc<ActivityLog>,
) -> ResponseRouter {
    ResponseRouter::new(intent, generative, threshold, activity)
}

/// 构建测试用应用状态
pub fn test_app_state(
    intent: Arc<dyn IntentService>,
    generative: Arc<dyn GenerativeService>,
    activity: Arc<ActivityLog>,
) -> Arc<AppState> {
    let router = ResponseRouter::new(intent, generative, 0.7, activity.clone());
    Arc::new(AppState {
        router,
        history: Arc::new(MemoryHistory::new()),
        activity,
    })
}

/// 启动测试服务器，返回监听地址
pub async fn spawn_app(state: Arc<AppState>) -> SocketAddr {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // 等待服务器启动
    tokio::time::sleep(Duration::from_millis(100)).await;

    addr
}
