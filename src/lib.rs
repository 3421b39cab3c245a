//! Taleweaver - 插图故事生成服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: 角色、场景、对白
//! - 场景分割器、对白提取器、故事排版
//!
//! 应用层 (application/):
//! - Ports: StoryWriter, ImageGenerator
//! - Commands: GenerateStory 命令处理器
//! - Prompts: 故事与插图提示词
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: Gemini 客户端, 文生图客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
