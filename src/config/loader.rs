//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, ImageProvider, LlmProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 未配置 `llm.api_key` 时读取的环境变量
const API_KEY_FALLBACK_ENV: &str = "GOOGLE_API_KEY";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TALEWEAVER_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `TALEWEAVER_SERVER__PORT=8080`
/// - `TALEWEAVER_LLM__PROVIDER=fake`
/// - `TALEWEAVER_IMAGE__URL=http://sd-server:7860/generate`
/// - `GOOGLE_API_KEY=...`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("server.body_limit_bytes", 1024 * 1024)?
        .set_default("llm.provider", "gemini")?
        .set_default("llm.base_url", "https://generativelanguage.googleapis.com/v1beta")?
        .set_default("llm.timeout_secs", 120)?
        .set_default("llm.max_output_tokens", 6000)?
        .set_default("image.provider", "http")?
        .set_default("image.url", "http://localhost:8001/generate")?
        .set_default("image.timeout_secs", 300)?
        .set_default("image.width", 1024)?
        .set_default("image.height", 1024)?
        .set_default("image.max_concurrent", 3)?
        .set_default("story.max_scenes", 10)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，例如 TALEWEAVER_IMAGE__MAX_CONCURRENT=4
    builder = builder.add_source(
        Environment::with_prefix("TALEWEAVER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    resolve_api_key(&mut app_config, std::env::var(API_KEY_FALLBACK_ENV).ok());
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 空的 api_key 视为未设置，再使用备用值
fn resolve_api_key(config: &mut AppConfig, fallback: Option<String>) {
    let configured = config
        .llm
        .api_key
        .take()
        .filter(|key| !key.trim().is_empty());

    config.llm.api_key = configured.or_else(|| fallback.filter(|key| !key.trim().is_empty()));
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.body_limit_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Request body limit cannot be 0".to_string(),
        ));
    }

    if config.server.static_files.enabled && config.server.static_files.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Static files directory cannot be empty when enabled".to_string(),
        ));
    }

    if config.llm.provider == LlmProvider::Gemini && config.llm.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.image.provider == ImageProvider::Http && config.image.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Image service URL cannot be empty".to_string(),
        ));
    }

    if config.image.width == 0 || config.image.height == 0 {
        return Err(ConfigError::ValidationError(
            "Image width and height must be positive".to_string(),
        ));
    }

    if config.image.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Image max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.story.max_scenes == 0 {
        return Err(ConfigError::ValidationError(
            "Story max_scenes cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Body Limit: {} bytes", config.server.body_limit_bytes);
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("LLM Provider: {:?}", config.llm.provider);
    if config.llm.provider == LlmProvider::Gemini {
        tracing::info!("LLM Base URL: {}", config.llm.base_url);
        tracing::info!(
            "LLM API Key: {}",
            if config.llm.api_key.is_some() { "<redacted>" } else { "<not set>" }
        );
        tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
    }
    tracing::info!("LLM Max Output Tokens: {}", config.llm.max_output_tokens);
    tracing::info!("Image Provider: {:?}", config.image.provider);
    if config.image.provider == ImageProvider::Http {
        tracing::info!("Image URL: {}", config.image.url);
        tracing::info!("Image Timeout: {}s", config.image.timeout_secs);
    }
    tracing::info!("Image Size: {}x{}", config.image.width, config.image.height);
    tracing::info!("Image Concurrency: {}", config.image.max_concurrent);
    tracing::info!("Max Scenes: {}", config.story.max_scenes);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
