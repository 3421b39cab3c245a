//! Fake Image Client - 用于测试与离线运行
//!
//! 始终返回 1x1 透明 PNG

use async_trait::async_trait;

use crate::application::ports::{GeneratedImage, ImageError, ImageGeneratorPort, ImageRequest};

/// 1x1 透明 PNG
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Fake Image Client
#[derive(Debug, Default)]
pub struct FakeImageClient;

impl FakeImageClient {
    pub fn new() -> Self {
        tracing::info!("FakeImageClient initialized");
        Self
    }
}

#[async_trait]
impl ImageGeneratorPort for FakeImageClient {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        tracing::debug!(
            prompt_len = request.prompt.len(),
            "FakeImageClient: returning placeholder image"
        );

        Ok(GeneratedImage {
            bytes: PLACEHOLDER_PNG.to_vec(),
            mime_type: "image/png".to_string(),
        })
    }
}
