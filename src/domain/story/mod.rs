//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 场景与对白实体
//! - 角色设定与故事设定值对象

mod entities;
mod value_objects;

pub use entities::{Dialogue, Scene, MAX_SCENE_DIALOGUES};
pub use value_objects::{CharacterProfile, StoryBrief};
