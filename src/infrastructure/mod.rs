//! 基础设施层
//!
//! 外部系统交互：意图识别服务、生成式模型、Web 接口与日志

pub mod activity;
pub mod intent;
pub mod llm;
pub mod logger;
pub mod web;
