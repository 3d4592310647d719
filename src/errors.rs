//! 标准化错误处理
//!
//! 定义项目专用的错误类型

use thiserror::Error;

/// 项目主要错误类型
#[derive(Error, Debug)]
pub enum ParlanceError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 网络请求错误
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 意图识别服务错误
    #[error("Intent service error: {0}")]
    IntentError(String),

    /// LLM 服务错误
    #[error("LLM service error: {0}")]
    LlmError(String),

    /// 存储相关错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 未知错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ParlanceError {
    fn from(err: anyhow::Error) -> Self {
        ParlanceError::Unknown(err.to_string())
    }
}

impl From<std::io::Error> for ParlanceError {
    fn from(err: std::io::Error) -> Self {
        ParlanceError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for ParlanceError {
    fn from(err: serde_json::Error) -> Self {
        ParlanceError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ParlanceError {
    fn from(err: reqwest::Error) -> Self {
        ParlanceError::NetworkError(err.to_string())
    }
}

/// 项目结果类型别名
pub type Result<T> = std::result::Result<T, ParlanceError>;
