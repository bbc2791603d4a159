//! 洞察接口处理函数

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use uuid::Uuid;

use crate::error::InsightError;
use crate::generator::workflow;
use crate::server::AppState;
use crate::server::request_log::RequestLogEntry;
use crate::server::types::ApiResponse;
use crate::types::{InsightBatch, RequestContext};

pub const GENERATE_ENDPOINT: &str = "/insights/generate";
pub const FINAL_ENDPOINT: &str = "/insights/final";

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET|POST /insights/generate - 为一组通话生成洞察并写入洞察池
pub async fn generate_insights(
    State(state): State<AppState>,
    payload: Result<Json<RequestContext>, JsonRejection>,
) -> ApiResponse {
    let request_id = Uuid::new_v4().to_string();
    let mut request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(&state, GENERATE_ENDPOINT, &request_id, rejection).await,
    };

    let response = match workflow::generate_insights(&state.pipeline, &mut request, &request_id)
        .await
    {
        Ok(batch) => ApiResponse::success(batch),
        Err(e) => failure(GENERATE_ENDPOINT, &request_id, &e),
    };

    state
        .log_request(GENERATE_ENDPOINT, &request_id, &request, &response)
        .await;
    response
}

/// GET|POST /insights/final - 汇总洞察池
pub async fn generate_final_summary(
    State(state): State<AppState>,
    payload: Result<Json<RequestContext>, JsonRejection>,
) -> ApiResponse {
    let request_id = Uuid::new_v4().to_string();
    let mut request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(&state, FINAL_ENDPOINT, &request_id, rejection).await,
    };

    let response =
        match workflow::generate_final_summary(&state.pipeline, &mut request, &request_id).await {
            Ok(record) => ApiResponse::success(InsightBatch::new(vec![record])),
            Err(e) => failure(FINAL_ENDPOINT, &request_id, &e),
        };

    state
        .log_request(FINAL_ENDPOINT, &request_id, &request, &response)
        .await;
    response
}

fn failure(endpoint: &str, request_id: &str, err: &InsightError) -> ApiResponse {
    if matches!(err, InsightError::EmptyPool) {
        tracing::info!(endpoint, request_id, "insight pool is empty");
    } else {
        tracing::error!(endpoint, request_id, error = %err, "request failed");
    }
    ApiResponse::from_error(err)
}

/// 请求体无法解析时按校验错误返回
async fn reject(
    state: &AppState,
    endpoint: &str,
    request_id: &str,
    rejection: JsonRejection,
) -> ApiResponse {
    let err = InsightError::Validation(rejection.body_text());
    let response = failure(endpoint, request_id, &err);
    state
        .log_request(endpoint, request_id, &RequestContext::default(), &response)
        .await;
    response
}

impl AppState {
    async fn log_request(
        &self,
        endpoint: &str,
        request_id: &str,
        request: &RequestContext,
        response: &ApiResponse,
    ) {
        if let Some(logger) = &self.request_log {
            logger
                .record(&RequestLogEntry::new(endpoint, request_id, request, response))
                .await;
        }
    }
}
