//! Story Writer Port - 大模型文本生成抽象
//!
//! 定义故事生成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 大模型调用错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("All models failed (tried {tried:?}): {last_error}")]
    AllModelsFailed {
        tried: Vec<String>,
        last_error: String,
    },
}

impl LlmError {
    /// 是否为配额/限流错误（不再尝试其他模型）
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }
}

/// 故事生成请求
#[derive(Debug, Clone)]
pub struct StoryWriteRequest {
    /// 完整提示词
    pub prompt: String,
    /// 用户选择的模型名（由适配器映射为候选模型列表）
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// 生成结果
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    pub text: String,
    /// 实际使用的模型
    pub model: String,
}

/// Story Writer Port
///
/// 外部大模型服务的抽象接口
#[async_trait]
pub trait StoryWriterPort: Send + Sync {
    /// 生成故事全文
    async fn write_story(&self, request: StoryWriteRequest) -> Result<GeneratedStory, LlmError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
