//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod image_generator;
mod story_writer;

pub use image_generator::{GeneratedImage, ImageError, ImageGeneratorPort, ImageRequest};
pub use story_writer::{GeneratedStory, LlmError, StoryWriteRequest, StoryWriterPort};
