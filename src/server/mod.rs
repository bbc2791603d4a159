//! HTTP服务

use anyhow::{Context, Result};
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::generator::PipelineContext;

pub mod handlers;
pub mod request_log;
pub mod routing;
pub mod types;

pub use request_log::RequestLogger;
pub use routing::create_router;
pub use types::ApiResponse;

/// 各处理函数共享的状态
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineContext>,
    pub request_log: Option<Arc<RequestLogger>>,
}

impl AppState {
    pub fn new(pipeline: Arc<PipelineContext>) -> Self {
        let request_log = pipeline
            .config
            .logging
            .request_log_path
            .clone()
            .map(|path| Arc::new(RequestLogger::new(path)));
        Self {
            pipeline,
            request_log,
        }
    }
}

/// 启动HTTP服务
pub async fn start_server(pipeline: Arc<PipelineContext>) -> Result<()> {
    let addr = pipeline.config.bind_address();
    let cors_permissive = pipeline.config.server.cors_permissive;

    let mut app = create_router(AppState::new(pipeline))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    if cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "voice-insights server listening");

    serve(listener, app).await.context("Server error")
}
