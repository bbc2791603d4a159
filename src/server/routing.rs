//! 路由配置

use axum::{Router, routing::get};

use crate::server::AppState;
use crate::server::handlers;

/// 创建应用路由，洞察接口同时接受GET与POST，带或不带末尾斜杠
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/insights/generate",
            get(handlers::generate_insights).post(handlers::generate_insights),
        )
        .route(
            "/insights/generate/",
            get(handlers::generate_insights).post(handlers::generate_insights),
        )
        .route(
            "/insights/final",
            get(handlers::generate_final_summary).post(handlers::generate_final_summary),
        )
        .route(
            "/insights/final/",
            get(handlers::generate_final_summary).post(handlers::generate_final_summary),
        )
        .with_state(state)
}
