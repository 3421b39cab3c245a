//! Domain Layer - 领域层
//!
//! - Story Context: 场景、对白、角色设定
//! - 场景分割、对白提取、故事排版：纯同步函数，不做 I/O，不返回错误

pub mod story;

mod dialogue_extractor;
mod scene_segmenter;
mod story_formatter;
mod text;

pub use dialogue_extractor::{
    extract_dialogues, CaptureOrder, DialogueMatcher, DEDUP_PREFIX_CHARS, DIALOGUE_MATCHERS,
    MAX_DIALOGUE_CHARS, MIN_DIALOGUE_CHARS,
};
pub use scene_segmenter::{segment_scenes, FallbackTable, SceneSegmenter, MAX_DESCRIPTION_CHARS};
pub use story::{CharacterProfile, Dialogue, Scene, StoryBrief};
pub use story_formatter::format_story;
pub use text::truncate_chars;
