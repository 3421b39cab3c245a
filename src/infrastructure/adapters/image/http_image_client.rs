//! HTTP Image Client - 调用外部文生图 HTTP 服务
//!
//! 实现 ImageGeneratorPort trait
//!
//! 外部 API:
//! POST {url}
//! Request: {"prompt": "...", "width": 1024, "height": 1024}  (JSON)
//! Response: image/* binary，或 JSON（`image` / `images[0]` / `data[0].b64_json`，base64 或 data URL）

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{GeneratedImage, ImageError, ImageGeneratorPort, ImageRequest};

const DEFAULT_MIME: &str = "image/png";

/// 文生图请求体 (JSON)
#[derive(Debug, Serialize)]
struct ImageHttpRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct ImageDataEntry {
    #[serde(default)]
    b64_json: Option<String>,
}

/// JSON 响应，兼容多种服务格式
#[derive(Debug, Default, Deserialize)]
struct ImageHttpResponse {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    data: Option<Vec<ImageDataEntry>>,
}

impl ImageHttpResponse {
    fn encoded_image(self) -> Option<String> {
        self.image
            .or_else(|| self.images.and_then(|v| v.into_iter().next()))
            .or_else(|| {
                self.data
                    .and_then(|v| v.into_iter().next())
                    .and_then(|entry| entry.b64_json)
            })
    }
}

/// 解码 base64 或 data URL
fn decode_image(encoded: &str) -> Result<GeneratedImage, ImageError> {
    let (mime_type, payload) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| ImageError::InvalidResponse("Malformed data URL".to_string()))?;
            let mime = header.trim_end_matches(";base64");
            let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
            (mime.to_string(), payload)
        }
        None => (DEFAULT_MIME.to_string(), encoded),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ImageError::InvalidResponse(format!("Base64 decode error: {}", e)))?;

    Ok(GeneratedImage { bytes, mime_type })
}

/// HTTP 文生图客户端配置
#[derive(Debug, Clone)]
pub struct HttpImageClientConfig {
    /// 生成接口完整 URL
    pub url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpImageClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8001/generate".to_string(),
            timeout_secs: 300,
        }
    }
}

impl HttpImageClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 文生图客户端
pub struct HttpImageClient {
    client: Client,
    config: HttpImageClientConfig,
}

impl HttpImageClient {
    pub fn new(config: HttpImageClientConfig) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ImageGeneratorPort for HttpImageClient {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        let body = ImageHttpRequest {
            prompt: &request.prompt,
            width: request.width,
            height: request.height,
        };

        tracing::debug!(
            url = %self.config.url,
            prompt_len = request.prompt.len(),
            "Sending image generation request"
        );

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageError::Timeout
                } else if e.is_connect() {
                    ImageError::NetworkError(format!("Cannot connect to image service: {}", e))
                } else {
                    ImageError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImageError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let image = if content_type.starts_with("image/") {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ImageError::InvalidResponse(format!("Failed to read image: {}", e)))?
                .to_vec();
            let mime_type = content_type
                .split(';')
                .next()
                .unwrap_or(DEFAULT_MIME)
                .trim()
                .to_string();
            GeneratedImage { bytes, mime_type }
        } else {
            let parsed: ImageHttpResponse = response
                .json()
                .await
                .map_err(|e| ImageError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
            let encoded = parsed
                .encoded_image()
                .ok_or_else(|| ImageError::InvalidResponse("No image data in response".to_string()))?;
            decode_image(&encoded)?
        };

        tracing::info!(
            mime_type = %image.mime_type,
            size = image.bytes.len(),
            "Image generated"
        );

        Ok(image)
    }
}
