//! Story Context - Value Objects

use serde::{Deserialize, Serialize};

/// 角色设定
///
/// 可选属性使用空字符串表示缺省
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub weapons: String,
}

impl CharacterProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }

    pub fn with_vehicle(mut self, vehicle: impl Into<String>) -> Self {
        self.vehicle = vehicle.into();
        self
    }

    pub fn with_weapons(mut self, weapons: impl Into<String>) -> Self {
        self.weapons = weapons.into();
        self
    }

    /// 故事提示词中的角色描述
    ///
    /// 例: `Aria - Appearance: silver hair - Weapons: twin daggers`
    pub fn description(&self) -> String {
        let mut desc = self.name.clone();
        if !self.appearance.is_empty() {
            desc.push_str(&format!(" - Appearance: {}", self.appearance));
        }
        if !self.vehicle.is_empty() {
            desc.push_str(&format!(" - Vehicle: {}", self.vehicle));
        }
        if !self.weapons.is_empty() {
            desc.push_str(&format!(" - Weapons: {}", self.weapons));
        }
        desc
    }

    /// 图片提示词中的角色外观
    ///
    /// 例: `Aria, silver hair, with a sky skiff, wielding twin daggers`
    pub fn visual(&self) -> String {
        let mut visual = self.name.clone();
        if !self.appearance.is_empty() {
            visual.push_str(&format!(", {}", self.appearance));
        }
        if !self.vehicle.is_empty() {
            visual.push_str(&format!(", with {}", self.vehicle));
        }
        if !self.weapons.is_empty() {
            visual.push_str(&format!(", wielding {}", self.weapons));
        }
        visual
    }
}

/// 一次故事生成的完整设定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBrief {
    pub genre: String,
    pub hero: CharacterProfile,
    pub companion: CharacterProfile,
    pub custom_prompt: String,
    pub scene_count: usize,
}
