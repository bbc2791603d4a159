//! 请求日志，每个请求追加一行JSON

use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::server::types::ApiResponse;
use crate::types::{InsightBatch, RequestContext};

const NO_TRANSCRIPT: &str = "[No transcription available]";

#[derive(Debug, Serialize)]
pub struct CallLogDetail<'a> {
    pub call_index: usize,
    pub call_type: &'a str,
    pub call_date: &'a str,
    #[serde(rename = "transcription_urls")]
    pub transcript: &'a str,
}

/// 一条请求日志
#[derive(Debug, Serialize)]
pub struct RequestLogEntry<'a> {
    pub timestamp: String,
    pub endpoint: &'a str,
    pub request_id: &'a str,
    pub glid: u64,
    pub executive_id: &'a str,
    pub customer_type: &'a str,
    pub customer_city: &'a str,
    pub total_calls: usize,
    pub call_data: Vec<CallLogDetail<'a>>,
    pub code: u16,
    pub status: &'a str,
    pub error: &'a str,
    pub response: &'a InsightBatch,
}

impl<'a> RequestLogEntry<'a> {
    pub fn new(
        endpoint: &'a str,
        request_id: &'a str,
        request: &'a RequestContext,
        response: &'a ApiResponse,
    ) -> Self {
        let call_data = request
            .calls
            .iter()
            .enumerate()
            .map(|(index, call)| CallLogDetail {
                call_index: index + 1,
                call_type: &call.call_kind,
                call_date: &call.call_date,
                transcript: request.transcript(index).unwrap_or(NO_TRANSCRIPT),
            })
            .collect();

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            endpoint,
            request_id,
            glid: request.customer_id,
            executive_id: &request.executive_id,
            customer_type: &request.customer_type,
            customer_city: &request.customer_city,
            total_calls: request.calls.len(),
            call_data,
            code: response.code,
            status: &response.status,
            error: &response.error,
            response: &response.response,
        }
    }
}

/// JSONL请求日志写入器，写入失败只记录告警
pub struct RequestLogger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RequestLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn record(&self, entry: &RequestLogEntry<'_>) {
        if let Err(e) = self.append(entry).await {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "failed to write request log"
            );
        }
    }

    async fn append(&self, entry: &RequestLogEntry<'_>) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightError;
    use crate::types::CallRecord;
    use tempfile::TempDir;

    fn request() -> RequestContext {
        RequestContext {
            customer_id: 77,
            executive_id: "EXE-3".to_string(),
            customer_type: "New".to_string(),
            customer_city: "Kochi".to_string(),
            calls: vec![
                CallRecord {
                    recording_reference: "rec-1".to_string(),
                    call_kind: "PNS".to_string(),
                    call_date: "2024-12-01".to_string(),
                },
                CallRecord {
                    recording_reference: "rec-2".to_string(),
                    call_kind: "C2C".to_string(),
                    call_date: "2024-12-02".to_string(),
                },
            ],
            transcripts: vec!["hello seller".to_string()],
            sample_limit: 5,
        }
    }

    #[tokio::test]
    async fn test_appends_one_line_per_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/requests.jsonl");
        let logger = RequestLogger::new(&path);
        let req = request();
        let response = ApiResponse::from_error(&InsightError::Completion("timeout".into()));

        logger
            .record(&RequestLogEntry::new("/insights/generate", "id-1", &req, &response))
            .await;
        logger
            .record(&RequestLogEntry::new("/insights/final", "id-2", &req, &response))
            .await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first = &lines[0];
        assert_eq!(first["endpoint"], "/insights/generate");
        assert_eq!(first["request_id"], "id-1");
        assert_eq!(first["glid"], 77);
        assert_eq!(first["total_calls"], 2);
        assert_eq!(first["code"], 502);
        assert_eq!(first["status"], "Failure");
        assert_eq!(first["call_data"][0]["transcription_urls"], "hello seller");
        assert_eq!(first["call_data"][1]["transcription_urls"], NO_TRANSCRIPT);
        assert_eq!(first["call_data"][1]["call_index"], 2);
        assert_eq!(lines[1]["endpoint"], "/insights/final");
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let logger = RequestLogger::new(blocker.join("requests.jsonl"));
        let req = request();
        let response = ApiResponse::success(InsightBatch::default());

        logger
            .record(&RequestLogEntry::new("/insights/generate", "id", &req, &response))
            .await;
    }
}
