use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{AppState, handlers, middleware::log_errors};

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/send-report", post(handlers::send_report))
        .layer(axum::middleware::from_fn(log_errors))
        // 页面直接从浏览器调用，允许所有来源
        .layer(CorsLayer::permissive())
        .with_state(state)
}
