//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（StoryWriter、ImageGenerator）
//! - commands: 故事生成命令及处理器
//! - prompts: 故事与插图提示词
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod prompts;

// Re-exports
pub use commands::{
    handlers::{to_data_url, GenerateStoryHandler, GenerationSettings},
    GenerateStoryCommand, GenerateStoryResponse, IllustratedScene,
};

pub use error::ApplicationError;

pub use ports::{
    // Image generator
    GeneratedImage,
    ImageError,
    ImageGeneratorPort,
    ImageRequest,
    // Story writer
    GeneratedStory,
    LlmError,
    StoryWriteRequest,
    StoryWriterPort,
};

pub use prompts::{build_image_prompt, build_story_prompt};
