//! Fake Story Writer - 用于测试与离线运行
//!
//! 不调用大模型，始终返回固定的分场景故事

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{GeneratedStory, LlmError, StoryWriteRequest, StoryWriterPort};

const CANNED_STORY: &str = "SCENE 1:
The old lighthouse leaned against the storm like a tired sentinel. Salt spray hissed on the rocks below, and somewhere above, the great lamp flickered back to life after a hundred dark years.

SCENE 2:
The spiral stairs wound upward into shadow. Every step groaned, and the walls were carved with tide charts no sailor had read in generations.

SCENE 3:
At the summit the lamp burned with a cold blue fire. Beyond the glass, the sea parted to reveal a road of black stone leading to the horizon.
";

/// Fake Story Writer 配置
#[derive(Debug, Clone)]
pub struct FakeStoryWriterConfig {
    /// 固定返回的故事文本
    pub story_text: String,
    /// 模拟生成延迟（毫秒）
    pub delay_ms: u64,
}

impl Default for FakeStoryWriterConfig {
    fn default() -> Self {
        Self {
            story_text: CANNED_STORY.to_string(),
            delay_ms: 200,
        }
    }
}

/// Fake Story Writer
pub struct FakeStoryWriter {
    config: FakeStoryWriterConfig,
}

impl FakeStoryWriter {
    pub fn new(config: FakeStoryWriterConfig) -> Self {
        tracing::info!(
            chars = config.story_text.chars().count(),
            delay_ms = config.delay_ms,
            "FakeStoryWriter initialized"
        );
        Self { config }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeStoryWriterConfig::default())
    }
}

#[async_trait]
impl StoryWriterPort for FakeStoryWriter {
    async fn write_story(&self, request: StoryWriteRequest) -> Result<GeneratedStory, LlmError> {
        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            "FakeStoryWriter: returning canned story"
        );

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        Ok(GeneratedStory {
            text: self.config.story_text.clone(),
            model: format!("fake-{}", request.model),
        })
    }
}
