//! LLM Adapter - 故事生成客户端实现

mod fake_story_writer;
mod gemini_client;

pub use fake_story_writer::{FakeStoryWriter, FakeStoryWriterConfig};
pub use gemini_client::*;
