//! 侧信道文件日志
//!
//! 每个自然日两个追加式日志文件（API 活动、错误），每个事件一行 JSON。
//! 仅用于可观测性，核心逻辑不消费这些文件。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct ApiEvent<'a> {
    timestamp: String,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> ApiEvent<'a> {
    fn new(kind: &'a str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            kind,
            endpoint: None,
            method: None,
            api_name: None,
            status_code: None,
            detail: None,
            error: None,
        }
    }
}

/// 活动日志
///
/// 写入失败只记警告，不影响请求处理
pub struct ActivityLog {
    dir: PathBuf,
}

impl ActivityLog {
    /// 创建活动日志，目录不存在时自动创建
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("cannot create log directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    /// 记录入站 API 请求
    pub fn api_request(&self, endpoint: &str, method: &str, detail: serde_json::Value) {
        let mut event = ApiEvent::new("api_request");
        event.endpoint = Some(endpoint);
        event.method = Some(method);
        event.detail = Some(detail);
        self.write(&event, false);
    }

    /// 记录出站 API 响应状态
    pub fn api_response(&self, endpoint: &str, status_code: u16, error: Option<&str>) {
        let mut event = ApiEvent::new("api_response");
        event.endpoint = Some(endpoint);
        event.status_code = Some(status_code);
        event.error = error;
        self.write(&event, error.is_some());
    }

    /// 记录外部服务调用
    pub fn external_call(&self, api_name: &str, detail: serde_json::Value) {
        let mut event = ApiEvent::new("external_api_call");
        event.api_name = Some(api_name);
        event.detail = Some(detail);
        self.write(&event, false);
    }

    /// 记录外部服务错误
    pub fn external_error(&self, api_name: &str, error: &str) {
        let mut event = ApiEvent::new("external_api_error");
        event.api_name = Some(api_name);
        event.error = Some(error);
        self.write(&event, true);
    }

    /// 当日 API 日志文件路径
    pub fn api_log_path(&self) -> PathBuf {
        self.dated_path("api")
    }

    /// 当日错误日志文件路径
    pub fn error_log_path(&self) -> PathBuf {
        self.dated_path("error")
    }

    fn dated_path(&self, prefix: &str) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.dir.join(format!("{}_{}.log", prefix, date))
    }

    fn write(&self, event: &ApiEvent<'_>, is_error: bool) {
        let path = if is_error {
            self.error_log_path()
        } else {
            self.api_log_path()
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("cannot serialize log event: {}", e);
                return;
            }
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{}", line));

        if let Err(e) = result {
            warn!("cannot write activity log {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_event_written_as_json_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path());

        log.api_request(
            "/process_input",
            "POST",
            serde_json::json!({ "message": "hello" }),
        );
        log.api_request(
            "/process_input",
            "POST",
            serde_json::json!({ "message": "again" }),
        );

        let content = std::fs::read_to_string(log.api_log_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "api_request");
        assert_eq!(first["endpoint"], "/process_input");
        assert_eq!(first["detail"]["message"], "hello");
        assert!(first["timestamp"].is_string());
    }

    #[test]
    fn test_errors_go_to_error_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path());

        log.external_call("dialogflow", serde_json::json!({ "confidence": 0.9 }));
        log.external_error("openrouter", "status 401");

        let api_content = std::fs::read_to_string(log.api_log_path()).unwrap();
        assert_eq!(api_content.lines().count(), 1);

        let error_content = std::fs::read_to_string(log.error_log_path()).unwrap();
        let event: serde_json::Value =
            serde_json::from_str(error_content.lines().next().unwrap()).unwrap();
        assert_eq!(event["kind"], "external_api_error");
        assert_eq!(event["api_name"], "openrouter");
        assert_eq!(event["error"], "status 401");
    }

    #[test]
    fn test_daily_file_naming() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path());

        let name = log.api_log_path();
        let name = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("api_"));
        assert!(name.ends_with(".log"));
        // api_YYYY-MM-DD.log
        assert_eq!(name.len(), "api_2026-01-01.log".len());
    }
}
