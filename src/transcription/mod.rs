//! 外部转写服务客户端

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TranscriptionConfig;
use crate::error::InsightError;

/// 一通待转写的录音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest<'a> {
    pub recording_reference: &'a str,
    /// 主叫方（客户）
    pub caller_id: String,
    /// 被叫方（坐席）
    pub receiver_id: &'a str,
}

/// 录音转写
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<String, InsightError>;
}

#[derive(Serialize)]
struct MetaKeys<'a> {
    #[serde(rename = "receiverId")]
    receiver_id: &'a str,
    #[serde(rename = "callerId")]
    caller_id: &'a str,
    #[serde(rename = "modid")]
    module_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(rename = "Code", default)]
    code: u16,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Data", default)]
    data: Option<TranscribeData>,
}

#[derive(Debug, Deserialize)]
struct TranscribeData {
    #[serde(rename = "MediaId", default)]
    media_id: String,
    #[serde(rename = "TranscriptionURL", default)]
    transcription_url: String,
}

/// 先提交录音拿到转写文本地址，再下载文本
pub struct HttpTranscriber {
    http: reqwest::Client,
    config: TranscriptionConfig,
}

impl HttpTranscriber {
    pub fn new(http: reqwest::Client, config: TranscriptionConfig) -> Self {
        Self { http, config }
    }

    /// 提交转写任务，返回转写文本的地址
    async fn submit(&self, request: &TranscriptionRequest<'_>) -> Result<String, InsightError> {
        let meta_keys = serde_json::to_string(&MetaKeys {
            receiver_id: request.receiver_id,
            caller_id: &request.caller_id,
            module_id: &self.config.module_id,
        })
        .map_err(|e| InsightError::Transcription(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("callRecordingLink", request.recording_reference.to_string())
            .text("callType", self.config.call_type.clone())
            .text("metaKeys", meta_keys);

        let response = self
            .http
            .post(&self.config.endpoint)
            .multipart(form)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await
            .map_err(|e| InsightError::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(InsightError::Transcription(format!(
                "transcription service returned HTTP {}",
                status
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Transcription(format!("invalid response body: {}", e)))?;
        if parsed.code != 200 {
            return Err(InsightError::Transcription(format!(
                "transcription service returned code {} ({})",
                parsed.code, parsed.status
            )));
        }

        let data = parsed
            .data
            .filter(|d| !d.transcription_url.trim().is_empty())
            .ok_or_else(|| {
                InsightError::Transcription("response carries no transcription URL".to_string())
            })?;
        tracing::debug!(media_id = %data.media_id, "transcription ready");
        Ok(data.transcription_url)
    }

    /// 下载转写文本
    async fn fetch_text(&self, url: &str) -> Result<String, InsightError> {
        let response = self
            .http
            .get(url)
            .timeout(Duration::from_secs(self.config.fetch_timeout_seconds))
            .send()
            .await
            .map_err(|e| InsightError::Transcription(format!("fetching transcript failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(InsightError::Transcription(format!(
                "transcript download returned HTTP {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| InsightError::Transcription(format!("reading transcript failed: {}", e)))
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<String, InsightError> {
        let url = self.submit(request).await?;
        self.fetch_text(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn transcriber(endpoint: String) -> HttpTranscriber {
        HttpTranscriber::new(
            reqwest::Client::new(),
            TranscriptionConfig {
                endpoint,
                ..TranscriptionConfig::default()
            },
        )
    }

    fn request() -> TranscriptionRequest<'static> {
        TranscriptionRequest {
            recording_reference: "https://recordings/42.mp3",
            caller_id: "1001".to_string(),
            receiver_id: "EXE-7",
        }
    }

    #[tokio::test]
    async fn test_transcribe_submits_and_downloads() {
        let mut server = Server::new_async().await;
        let text_url = format!("{}/texts/42.txt", server.url());
        let submit = server
            .mock("POST", "/transcribe")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"callRecordingLink\"".to_string()),
                Matcher::Regex("https://recordings/42.mp3".to_string()),
                Matcher::Regex("name=\"callType\"".to_string()),
                Matcher::Regex("PNS".to_string()),
                Matcher::Regex(r#""receiverId":"EXE-7""#.to_string()),
                Matcher::Regex(r#""callerId":"1001""#.to_string()),
                Matcher::Regex(r#""modid":"LMS""#.to_string()),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "Code": 200,
                    "Status": "Success",
                    "Data": {"MediaId": "m-42", "Status": "done", "TranscriptionURL": text_url}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let download = server
            .mock("GET", "/texts/42.txt")
            .with_status(200)
            .with_body("Customer: my listing is not visible")
            .create_async()
            .await;

        let text = transcriber(format!("{}/transcribe", server.url()))
            .transcribe(&request())
            .await
            .unwrap();

        assert_eq!(text, "Customer: my listing is not visible");
        submit.assert_async().await;
        download.assert_async().await;
    }

    #[tokio::test]
    async fn test_body_code_failure() {
        let mut server = Server::new_async().await;
        let _submit = server
            .mock("POST", "/transcribe")
            .with_status(200)
            .with_body(r#"{"Code": 500, "Status": "Failure", "Data": null}"#)
            .create_async()
            .await;

        let err = transcriber(format!("{}/transcribe", server.url()))
            .transcribe(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::Transcription(ref m) if m.contains("500")));
        assert!(err.is_service_failure());
    }

    #[tokio::test]
    async fn test_missing_data_failure() {
        let mut server = Server::new_async().await;
        let _submit = server
            .mock("POST", "/transcribe")
            .with_status(200)
            .with_body(r#"{"Code": 200, "Status": "Success"}"#)
            .create_async()
            .await;

        let err = transcriber(format!("{}/transcribe", server.url()))
            .transcribe(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_http_status_failure() {
        let mut server = Server::new_async().await;
        let _submit = server
            .mock("POST", "/transcribe")
            .with_status(502)
            .create_async()
            .await;

        let err = transcriber(format!("{}/transcribe", server.url()))
            .transcribe(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::Transcription(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_download_failure() {
        let mut server = Server::new_async().await;
        let text_url = format!("{}/texts/missing.txt", server.url());
        let _submit = server
            .mock("POST", "/transcribe")
            .with_status(200)
            .with_body(
                serde_json::json!({"Code": 200, "Status": "Success", "Data": {"TranscriptionURL": text_url}})
                    .to_string(),
            )
            .create_async()
            .await;
        let _download = server
            .mock("GET", "/texts/missing.txt")
            .with_status(404)
            .create_async()
            .await;

        let err = transcriber(format!("{}/transcribe", server.url()))
            .transcribe(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::Transcription(ref m) if m.contains("404")));
    }
}
