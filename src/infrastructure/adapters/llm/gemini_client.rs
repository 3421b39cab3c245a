//! Gemini Story Writer - 调用 Gemini REST API 生成故事
//!
//! 实现 StoryWriterPort trait
//!
//! 外部 API:
//! POST {base_url}/models/{model}:generateContent
//! Header: x-goog-api-key
//! Request: {"contents": [...], "generationConfig": {...}}  (JSON)
//!
//! 用户选择的模型名映射为有序的候选列表，依次尝试；
//! 配额错误（HTTP 429 / "quota"）立即返回，不再尝试后续模型

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{GeneratedStory, LlmError, StoryWriteRequest, StoryWriterPort};

/// 将用户选择的模型名映射为候选模型（按尝试顺序）
pub fn model_candidates(requested: &str) -> Vec<&'static str> {
    match requested {
        "gemini-1.5-flash" => vec![
            "gemini-flash-latest",
            "gemini-2.5-flash",
            "gemini-2.0-flash",
            "gemini-2.0-flash-lite",
        ],
        "gemini-1.5-pro" => vec!["gemini-pro-latest", "gemini-2.5-pro", "gemini-2.0-flash"],
        _ => vec![
            "gemini-flash-latest",
            "gemini-2.0-flash",
            "gemini-2.0-flash-lite",
        ],
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// generateContent 请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

/// generateContent 响应体
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// 拼接第一个有文本的候选结果
fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .find(|text| !text.trim().is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("No text in model response".to_string()))
}

/// 根据 HTTP 状态码和响应体分类错误
fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let lowered = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS || lowered.contains("quota") {
        LlmError::QuotaExceeded(format!("HTTP {}", status))
    } else if status == StatusCode::NOT_FOUND {
        LlmError::ModelUnavailable(format!("HTTP {}: {}", status, body))
    } else {
        LlmError::ServiceError(format!("HTTP {}: {}", status, body))
    }
}

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// API Key，为空时所有请求返回 MissingApiKey
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl GeminiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Gemini 故事生成客户端
pub struct GeminiStoryWriter {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiStoryWriter {
    pub fn new(config: GeminiClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    /// 使用单个模型生成
    async fn generate_with(&self, model: &str, request: &StoryWriteRequest) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };

        tracing::debug!(
            model = %model,
            prompt_len = request.prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::NetworkError(format!("Cannot connect to Gemini API: {}", e))
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &error_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_text(parsed)
    }
}

#[async_trait]
impl StoryWriterPort for GeminiStoryWriter {
    async fn write_story(&self, request: StoryWriteRequest) -> Result<GeneratedStory, LlmError> {
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let candidates = model_candidates(&request.model);
        let mut last_error = String::from("no candidate models");

        for model in &candidates {
            match self.generate_with(model, &request).await {
                Ok(text) => {
                    tracing::info!(model = %model, chars = text.chars().count(), "Story generated");
                    return Ok(GeneratedStory {
                        text,
                        model: model.to_string(),
                    });
                }
                Err(e) if e.is_quota() => {
                    tracing::warn!(model = %model, error = %e, "Quota exceeded, giving up");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "Model failed, trying next candidate");
                    last_error = e.to_string();
                }
            }
        }

        Err(LlmError::AllModelsFailed {
            tried: candidates.iter().map(|m| m.to_string()).collect(),
            last_error,
        })
    }

    async fn health_check(&self) -> bool {
        if self.config.api_key.trim().is_empty() {
            return false;
        }
        match self
            .client
            .get(self.models_url())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_candidates() {
        assert_eq!(model_candidates("gemini-1.5-flash")[0], "gemini-flash-latest");
        assert_eq!(model_candidates("gemini-1.5-flash").len(), 4);
        assert_eq!(
            model_candidates("gemini-1.5-pro"),
            vec!["gemini-pro-latest", "gemini-2.5-pro", "gemini-2.0-flash"]
        );
        assert_eq!(model_candidates("anything-else").len(), 3);
    }

    #[test]
    fn test_classify_failure() {
        assert!(classify_failure(StatusCode::TOO_MANY_REQUESTS, "").is_quota());
        assert!(classify_failure(StatusCode::FORBIDDEN, "Quota exceeded for metric").is_quota());
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "models/x is not found"),
            LlmError::ModelUnavailable(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "permission denied"),
            LlmError::ServiceError(_)
        ));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"SCENE 1: "},{"text":"Hello."}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "SCENE 1: Hello.");
    }

    #[test]
    fn test_extract_text_empty_response() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_text(parsed), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 6000,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 6000);
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_config_builder() {
        let config = GeminiClientConfig::new("key")
            .with_base_url("http://localhost:9000/v1beta/")
            .with_timeout(30);
        let writer = GeminiStoryWriter::new(config).unwrap();
        assert_eq!(
            writer.generate_url("gemini-2.0-flash"),
            "http://localhost:9000/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let writer = GeminiStoryWriter::new(GeminiClientConfig::default()).unwrap();
        let request = StoryWriteRequest {
            prompt: "Write.".to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.8,
            max_output_tokens: 100,
        };
        assert!(matches!(
            writer.write_story(request).await,
            Err(LlmError::MissingApiKey)
        ));
    }
}
