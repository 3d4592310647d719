//! 会话后端框架
//!
//! 提供意图识别与生成式模型之间的路由能力：
//! - 意图识别（Dialogflow 风格 REST API）
//! - 生成式回复（OpenRouter，OpenAI 兼容接口）
//! - 置信度路由与降级（fallback）
//! - 会话历史（内存追加存储）
//!
//! # 架构分层
//!
//! - `core`: 核心层，配置与会话历史
//! - `infrastructure`: 基础设施层，外部服务与 Web 接口
//! - `application`: 应用层，路由编排

// 核心层
pub mod core;

// 基础设施层
pub mod infrastructure;

// 应用层
pub mod application;

// 错误类型
pub mod errors;

// 重新导出核心类型
pub use core::config::AppConfig;
pub use core::history::{
    escape_html, HistoryStore, Interaction, MemoryHistory, ReplyResult, ReplySource,
};

// 重新导出基础设施类型
pub use infrastructure::activity::ActivityLog;
pub use infrastructure::intent::{IntentClient, IntentOutcome, IntentService, UnconfiguredIntent};
pub use infrastructure::llm::{GenerativeReply, GenerativeService, OpenRouterClient};
pub use infrastructure::logger;
pub use infrastructure::web::{create_router, start_web_server, AppState};

// 重新导出应用类型
pub use application::router::{ResponseRouter, APOLOGY_REPLY};

pub use errors::{ParlanceError, Result};

/// 框架版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
