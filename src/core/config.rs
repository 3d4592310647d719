use clap::Parser;
use tracing::warn;

/// OpenRouter 聊天补全接口（固定常量）
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// 意图识别语言
pub const INTENT_LANGUAGE_CODE: &str = "en";

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Conversational backend with intent routing and generative fallback"
)]
pub struct AppConfig {
    /// HTTP 服务监听地址
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind_addr: String,

    // 意图识别服务配置
    /// 意图识别服务端点
    #[arg(
        long,
        env = "INTENT_ENDPOINT",
        default_value = "https://dialogflow.googleapis.com"
    )]
    pub intent_endpoint: String,

    /// 凭证文件路径（文件内容为 Bearer token）
    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        default_value = "dialogflow_credentials.json"
    )]
    pub intent_credentials: String,

    /// 意图识别项目 ID
    #[arg(long, env = "DIALOGFLOW_PROJECT_ID")]
    pub intent_project_id: Option<String>,

    /// 会话 ID（所有请求共用一个外部会话）
    #[arg(long, env = "DIALOGFLOW_SESSION_ID", default_value = "unique-session-id")]
    pub session_id: String,

    /// 置信度阈值，低于该值时降级到生成式模型
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.7)]
    pub confidence_threshold: f32,

    // 生成式模型配置
    #[arg(long, env = "OPENROUTER_API_KEY")]
    pub openrouter_api_key: Option<String>,

    #[arg(
        long,
        env = "OPENROUTER_MODEL",
        default_value = "mistralai/mistral-7b-instruct"
    )]
    pub openrouter_model: String,

    /// 出站请求超时（秒）
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// 侧信道日志文件目录
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: String,
}

impl AppConfig {
    /// 验证配置的有效性
    ///
    /// 缺失的外部服务凭证不致命：意图识别失败会静默降级，
    /// 生成式模型缺失密钥会以道歉语回复用户。
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.intent_project_id.is_none() {
            warn!("DIALOGFLOW_PROJECT_ID is not set; intent detection will fail over to the generative model");
        }

        if self.openrouter_api_key.is_none() {
            warn!("OPENROUTER_API_KEY is not set; generative fallback will return an apology");
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
                self.confidence_threshold
            );
        }

        Ok(())
    }
}
