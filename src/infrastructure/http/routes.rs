//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping       GET   存活检查
//! - /api/health     GET   依赖服务健康检查
//! - /api/generate   POST  生成带插图的故事
//! - /favicon.ico    GET   204

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/favicon.ico", get(handlers::favicon))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate_story))
}
