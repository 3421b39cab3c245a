//! Story HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::infrastructure::http::dto::{GenerateStoryRequest, GenerateStoryResponseDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成带插图的故事
///
/// POST /api/generate
pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateStoryRequest>, JsonRejection>,
) -> Result<Json<GenerateStoryResponseDto>, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate_story", %request_id);

    async move {
        tracing::info!(
            model = %request.model,
            genre = %request.genre,
            num_images = request.num_images,
            "Story generation requested"
        );

        let response = state
            .generate_story_handler
            .handle(request.into_command())
            .await?;

        tracing::info!(
            model = %response.model,
            images = response.images.len(),
            "Story generation finished"
        );

        Ok::<_, ApiError>(Json(GenerateStoryResponseDto::from(response)))
    }
    .instrument(span)
    .await
}

/// 浏览器自动请求的图标，直接返回空响应
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
