//! Web 服务器模块
//!
//! 提供页面渲染与消息处理两个端点

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::application::router::ResponseRouter;
use crate::core::history::{HistoryStore, Interaction, ReplySource};
use crate::infrastructure::activity::ActivityLog;

// ==================== 错误响应 ====================

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ==================== 状态 ====================

pub struct AppState {
    pub router: ResponseRouter,
    pub history: Arc<dyn HistoryStore>,
    pub activity: Arc<ActivityLog>,
}

// ==================== 请求类型 ====================

#[derive(Deserialize)]
pub struct ProcessInputRequest {
    pub message: String,
}

// ==================== 处理器 ====================

/// 健康检查
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 渲染主页面，嵌入全部会话历史
async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let interactions = match state.history.snapshot().await {
        Ok(interactions) => interactions,
        Err(e) => {
            error!("failed to load conversation history: {}", e);
            Vec::new()
        }
    };

    Html(render_page(&interactions))
}

/// 处理用户输入：路由 → 记录 → 响应
async fn process_input(
    State(state): State<Arc<AppState>>,
    Form(req): Form<ProcessInputRequest>,
) -> impl IntoResponse {
    info!("processing input: {}", req.message);
    state.activity.api_request(
        "/process_input",
        "POST",
        serde_json::json!({ "message": req.message }),
    );

    let result = state.router.route(&req.message).await;
    let interaction = state.history.record(&req.message, &result).await;

    match interaction_payload(&interaction) {
        Ok(payload) => {
            state.activity.api_response("/process_input", 200, None);
            Json(payload).into_response()
        }
        Err(e) => {
            error!("error processing input: {}", e);
            state
                .activity
                .api_response("/process_input", 500, Some(&e.to_string()));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "An error occurred while processing your request".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// 序列化交互记录，附带前端约定的 `response` 字段
fn interaction_payload(interaction: &Interaction) -> serde_json::Result<serde_json::Value> {
    let mut payload = serde_json::to_value(interaction)?;
    if let serde_json::Value::Object(ref mut obj) = payload {
        obj.insert(
            "response".to_string(),
            serde_json::Value::String(interaction.bot_response.clone()),
        );
    }
    Ok(payload)
}

// ==================== 页面渲染 ====================

/// 单条历史记录的来源说明
fn source_info(interaction: &Interaction) -> String {
    match interaction.source {
        ReplySource::IntentService => format!(
            r#"<span class="source-info">Intent: {} (Confidence: {:.2})</span>"#,
            interaction.intent.as_deref().unwrap_or_default(),
            interaction.confidence.unwrap_or_default(),
        ),
        ReplySource::GenerativeService => format!(
            r#"<span class="source-info">Model: {}</span>"#,
            interaction.model.as_deref().unwrap_or("AI Model"),
        ),
        ReplySource::Error => String::new(),
    }
}

fn render_page(interactions: &[Interaction]) -> String {
    let mut history = String::new();
    for interaction in interactions {
        // user_input 在记录时已转义
        history.push_str(&format!(
            r#"        <div class="message-container">
            <div class="timestamp">{}</div>
            <div class="user-message"><strong>You:</strong> {}</div>
            <div class="assistant-message"><strong>Assistant:</strong> {} {}</div>
        </div>
"#,
            interaction.timestamp.format("%Y-%m-%d %H:%M:%S"),
            interaction.user_input,
            interaction.bot_response,
            source_info(interaction),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Assistant</title>
    <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
    <div id="chat-container">
{}    </div>
    <form id="voice-form">
        <input type="text" id="text-input" name="message" placeholder="Type a message..." autocomplete="off">
        <button type="button" id="voice-button">🎤</button>
        <button type="submit">Send</button>
    </form>
    <script src="/static/js/main.js"></script>
</body>
</html>
"#,
        history
    )
}

// ==================== 路由 ====================

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(index))
        .route("/process_input", post(process_input))
        .route("/api/health", get(health_check))
        .nest_service("/static", ServeDir::new("static"))
        .layer(cors)
        .with_state(state)
}

// ==================== 服务器启动 ====================

pub async fn start_web_server(bind_addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Web server started on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
