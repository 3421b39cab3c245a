//! Ping Handler
//!
//! 存活检查与依赖服务健康检查

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::dto::HealthResponse;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 存活检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health endpoint - 检查大模型与文生图服务
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (llm, image) = tokio::join!(
        state.story_writer.health_check(),
        state.image_generator.health_check()
    );

    Json(HealthResponse {
        status: if llm && image { "ok" } else { "degraded" },
        llm,
        image,
    })
}
