//! Story Commands - 故事生成命令

use serde::Serialize;

use crate::domain::{CharacterProfile, Dialogue};

/// 生成插图故事命令
#[derive(Debug, Clone)]
pub struct GenerateStoryCommand {
    /// 用户选择的模型名
    pub model: String,
    pub temperature: f32,
    pub genre: String,
    pub hero: CharacterProfile,
    pub companion: CharacterProfile,
    pub custom_prompt: String,
    /// 场景（插图）数量
    pub scene_count: usize,
}

/// 带插图的场景
#[derive(Debug, Clone, Serialize)]
pub struct IllustratedScene {
    /// `data:image/png;base64,...`
    pub image: String,
    /// 场景描述
    pub scene: String,
    pub dialogues: Vec<Dialogue>,
}

/// 生成结果
#[derive(Debug, Clone)]
pub struct GenerateStoryResponse {
    /// 排版后的正文
    pub story: String,
    /// 成功生成插图的场景（按场景顺序）
    pub images: Vec<IllustratedScene>,
    /// 实际使用的模型
    pub model: String,
}
