//! 核心层
//!
//! 包含配置与会话历史等领域模型

pub mod config;
pub mod history;
