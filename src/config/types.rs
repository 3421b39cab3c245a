//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 大模型配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 文生图配置
    #[serde(default)]
    pub image: ImageConfig,

    /// 故事生成配置
    #[serde(default)]
    pub story: StoryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录（托管在根路径）
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

/// 大模型提供方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Fake,
}

/// 大模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Gemini REST 基础 URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API Key，未设置时读取 GOOGLE_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 最大输出 token 数
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_max_output_tokens() -> u32 {
    6000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: default_llm_base_url(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// 文生图提供方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    #[default]
    Http,
    Fake,
}

/// 文生图配置
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub provider: ImageProvider,

    /// 文生图服务 URL
    #[serde(default = "default_image_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_image_size")]
    pub width: u32,

    #[serde(default = "default_image_size")]
    pub height: u32,

    /// 同时进行的插图请求数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_image_url() -> String {
    "http://localhost:8001/generate".to_string()
}

fn default_image_timeout() -> u64 {
    300
}

fn default_image_size() -> u32 {
    1024
}

fn default_max_concurrent() -> usize {
    3
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: ImageProvider::default(),
            url: default_image_url(),
            timeout_secs: default_image_timeout(),
            width: default_image_size(),
            height: default_image_size(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 故事生成配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    /// 单次请求允许的最大场景数
    #[serde(default = "default_max_scenes")]
    pub max_scenes: usize,
}

fn default_max_scenes() -> usize {
    10
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            max_scenes: default_max_scenes(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
