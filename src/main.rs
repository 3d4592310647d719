use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use parlance::application::router::ResponseRouter;
use parlance::core::config::AppConfig;
use parlance::core::history::MemoryHistory;
use parlance::infrastructure::activity::ActivityLog;
use parlance::infrastructure::intent::{IntentClient, IntentService, UnconfiguredIntent};
use parlance::infrastructure::llm::OpenRouterClient;
use parlance::infrastructure::logger;
use parlance::infrastructure::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logger::init();

    let cfg = AppConfig::parse();
    cfg.validate()?;

    info!("using credentials file: {}", cfg.intent_credentials);
    info!(
        "project id: {}",
        cfg.intent_project_id.as_deref().unwrap_or("<unset>")
    );
    info!("OpenRouter model: {}", cfg.openrouter_model);

    let timeout = Duration::from_secs(cfg.request_timeout_secs);

    // 意图服务构建失败不致命：降级路径接管
    let intent: Arc<dyn IntentService> = match &cfg.intent_project_id {
        Some(project_id) => match IntentClient::from_credentials_file(
            &cfg.intent_endpoint,
            &cfg.intent_credentials,
            project_id,
            &cfg.session_id,
            timeout,
        ) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("intent client unavailable: {}", e);
                Arc::new(UnconfiguredIntent)
            }
        },
        None => Arc::new(UnconfiguredIntent),
    };

    let generative = Arc::new(OpenRouterClient::new(
        cfg.openrouter_api_key.clone(),
        cfg.openrouter_model.clone(),
    ));

    let activity = Arc::new(ActivityLog::new(&cfg.log_dir));

    let router = ResponseRouter::new(
        intent,
        generative,
        cfg.confidence_threshold,
        activity.clone(),
    );

    let state = Arc::new(AppState {
        router,
        history: Arc::new(MemoryHistory::new()),
        activity,
    });

    start_web_server(&cfg.bind_addr, state).await
}
