//! Image Generator Port - 文生图抽象

use async_trait::async_trait;
use thiserror::Error;

/// 文生图错误
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 文生图请求
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// 生成的图片
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// 原始图片字节
    pub bytes: Vec<u8>,
    /// MIME 类型，例如 `image/png`
    pub mime_type: String,
}

/// Image Generator Port
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError>;

    async fn health_check(&self) -> bool {
        true
    }
}
