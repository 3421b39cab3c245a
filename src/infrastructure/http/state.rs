//! Application State

use std::sync::Arc;

use crate::application::{GenerateStoryHandler, ImageGeneratorPort, StoryWriterPort};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub story_writer: Arc<dyn StoryWriterPort>,
    pub image_generator: Arc<dyn ImageGeneratorPort>,

    // ========== Command Handlers ==========
    pub generate_story_handler: GenerateStoryHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        story_writer: Arc<dyn StoryWriterPort>,
        image_generator: Arc<dyn ImageGeneratorPort>,
        generate_story_handler: GenerateStoryHandler,
    ) -> Self {
        Self {
            story_writer,
            image_generator,
            generate_story_handler,
        }
    }
}
