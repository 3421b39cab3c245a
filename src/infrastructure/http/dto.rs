//! Data Transfer Objects
//!
//! `/api/generate` 的请求与响应结构

use serde::{Deserialize, Serialize};

use crate::application::{GenerateStoryCommand, GenerateStoryResponse, IllustratedScene};
use crate::domain::CharacterProfile;

// ============================================================================
// 请求
// ============================================================================

/// 故事生成请求，所有字段均可省略
#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_genre")]
    pub genre: String,

    #[serde(default = "default_character1_name")]
    pub character1_name: String,
    #[serde(default)]
    pub character1_appearance: String,
    #[serde(default)]
    pub character1_vehicle: String,
    #[serde(default)]
    pub character1_weapons: String,

    #[serde(default = "default_character2_name")]
    pub character2_name: String,
    #[serde(default)]
    pub character2_appearance: String,
    #[serde(default)]
    pub character2_vehicle: String,
    #[serde(default)]
    pub character2_weapons: String,

    #[serde(default)]
    pub custom_prompt: String,
    #[serde(default = "default_num_images")]
    pub num_images: usize,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_genre() -> String {
    "Fantasy".to_string()
}

fn default_character1_name() -> String {
    "Hero".to_string()
}

fn default_character2_name() -> String {
    "Mentor".to_string()
}

fn default_num_images() -> usize {
    5
}

impl Default for GenerateStoryRequest {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            genre: default_genre(),
            character1_name: default_character1_name(),
            character1_appearance: String::new(),
            character1_vehicle: String::new(),
            character1_weapons: String::new(),
            character2_name: default_character2_name(),
            character2_appearance: String::new(),
            character2_vehicle: String::new(),
            character2_weapons: String::new(),
            custom_prompt: String::new(),
            num_images: default_num_images(),
        }
    }
}

impl GenerateStoryRequest {
    /// 转换为应用层命令（名称与属性去除首尾空白）
    pub fn into_command(self) -> GenerateStoryCommand {
        let hero = CharacterProfile::new(self.character1_name.trim())
            .with_appearance(self.character1_appearance.trim())
            .with_vehicle(self.character1_vehicle.trim())
            .with_weapons(self.character1_weapons.trim());
        let companion = CharacterProfile::new(self.character2_name.trim())
            .with_appearance(self.character2_appearance.trim())
            .with_vehicle(self.character2_vehicle.trim())
            .with_weapons(self.character2_weapons.trim());

        GenerateStoryCommand {
            model: self.model,
            temperature: self.temperature,
            genre: self.genre,
            hero,
            companion,
            custom_prompt: self.custom_prompt,
            scene_count: self.num_images,
        }
    }
}

// ============================================================================
// 响应
// ============================================================================

/// 故事生成成功响应
#[derive(Debug, Serialize)]
pub struct GenerateStoryResponseDto {
    pub success: bool,
    pub story: String,
    pub images: Vec<IllustratedScene>,
}

impl From<GenerateStoryResponse> for GenerateStoryResponseDto {
    fn from(response: GenerateStoryResponse) -> Self {
        Self {
            success: true,
            story: response.story,
            images: response.images,
        }
    }
}

/// 依赖服务健康状态
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm: bool,
    pub image: bool,
}
