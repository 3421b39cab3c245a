//! Story Context - Entities

use serde::{Deserialize, Serialize};

/// 单句对白
///
/// 不变量:
/// - speaker 为两个已知角色名之一（使用调用方提供的原始拼写）
/// - text 已去除首尾空白，长度在 (5, 200] 字符之间（由提取器保证）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    speaker: String,
    text: String,
}

impl Dialogue {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 图片提示词中使用的 "speaker: text" 形式
    pub fn as_caption(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

/// 场景 - 一张插图对应的故事单元
///
/// 不变量:
/// - description 非空
/// - dialogues 数量在 1..=4 之间（真实提取或回退内容）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    description: String,
    dialogues: Vec<Dialogue>,
}

impl Scene {
    pub fn new(description: String, dialogues: Vec<Dialogue>) -> Result<Self, &'static str> {
        if description.trim().is_empty() {
            return Err("场景描述不能为空");
        }
        if dialogues.is_empty() {
            return Err("场景至少需要一句对白");
        }
        if dialogues.len() > MAX_SCENE_DIALOGUES {
            return Err("场景对白不能超过4句");
        }
        Ok(Self {
            description,
            dialogues,
        })
    }

    /// 分割器内部构建，调用方已保证不变量
    pub(crate) fn assemble(description: String, dialogues: Vec<Dialogue>) -> Self {
        debug_assert!(!description.trim().is_empty());
        debug_assert!((1..=MAX_SCENE_DIALOGUES).contains(&dialogues.len()));
        Self {
            description,
            dialogues,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn dialogues(&self) -> &[Dialogue] {
        &self.dialogues
    }

    pub fn into_parts(self) -> (String, Vec<Dialogue>) {
        (self.description, self.dialogues)
    }
}

/// 每个场景最多保留的对白数
pub const MAX_SCENE_DIALOGUES: usize = 4;
