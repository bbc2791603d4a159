//! HTTP响应结构

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, InsightError};
use crate::types::InsightBatch;

pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_FAILURE: &str = "Failure";

/// 所有接口统一的响应信封
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
    pub response: InsightBatch,
}

impl ApiResponse {
    pub fn success(batch: InsightBatch) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            status: STATUS_SUCCESS.to_string(),
            error: String::new(),
            response: batch,
        }
    }

    /// 按错误分类生成响应，空洞察池视为成功但不带记录
    pub fn from_error(err: &InsightError) -> Self {
        let (code, status) = match err.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, STATUS_FAILURE),
            ErrorKind::ExternalService => (StatusCode::BAD_GATEWAY, STATUS_FAILURE),
            ErrorKind::Decode | ErrorKind::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, STATUS_FAILURE)
            }
            ErrorKind::EmptyPool => (StatusCode::OK, STATUS_SUCCESS),
        };
        Self {
            code: code.as_u16(),
            status: status.to_string(),
            error: err.to_string(),
            response: InsightBatch::default(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InsightError::Validation("glid".into()), 400, STATUS_FAILURE),
            (InsightError::Transcription("down".into()), 502, STATUS_FAILURE),
            (InsightError::Completion("503".into()), 502, STATUS_FAILURE),
            (InsightError::Extraction, 500, STATUS_FAILURE),
            (InsightError::UnexpectedBatchSize(3), 500, STATUS_FAILURE),
            (InsightError::CorruptPool("bad".into()), 500, STATUS_FAILURE),
            (InsightError::EmptyPool, 200, STATUS_SUCCESS),
        ];

        for (err, code, status) in cases {
            let response = ApiResponse::from_error(&err);
            assert_eq!(response.code, code, "{}", err);
            assert_eq!(response.status, status, "{}", err);
            assert!(response.response.is_empty());
        }
    }

    #[test]
    fn test_envelope_wire_shape() {
        let value = serde_json::to_value(ApiResponse::from_error(&InsightError::EmptyPool)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "code": 200,
                "status": "Success",
                "error": "No insights available to summarize",
                "response": {"ensights": []}
            })
        );
    }
}
