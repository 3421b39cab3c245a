//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use super::ports::LlmError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务配额耗尽
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<LlmError> for ApplicationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::QuotaExceeded(msg) => Self::QuotaExceeded(format!(
                "You've hit your API rate limit. Please wait and try again later. ({})",
                msg
            )),
            other => Self::ExternalServiceError(format!("Unable to generate story: {}", other)),
        }
    }
}
