//! 对白提取器
//!
//! 从一段自由文本中按固定顺序的匹配规则提取带说话人的对白。
//! 所有规则的匹配结果先全部收集，再统一去重并截取前 4 条。

use std::collections::HashSet;

use regex::{Captures, Regex};

use super::story::{Dialogue, MAX_SCENE_DIALOGUES};
use super::text::{char_len, truncate_chars};

/// 对白最短长度（不含），短于等于此值的匹配被丢弃
pub const MIN_DIALOGUE_CHARS: usize = 5;

/// 对白最大长度，超出部分截断
pub const MAX_DIALOGUE_CHARS: usize = 200;

/// 去重键使用的对白前缀长度
pub const DEDUP_PREFIX_CHARS: usize = 50;

/// 模板中角色名的占位符，替换为 `name1|name2`
const NAMES_PLACEHOLDER: &str = "{names}";

/// 捕获组顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrder {
    /// 第 1 组为说话人，第 2 组为对白
    SpeakerFirst,
    /// 第 1 组为对白，第 2 组为说话人
    TextFirst,
}

/// 单条匹配规则
#[derive(Debug, Clone, Copy)]
pub struct DialogueMatcher {
    pub name: &'static str,
    template: &'static str,
    pub order: CaptureOrder,
}

/// 按优先顺序排列的匹配规则
pub const DIALOGUE_MATCHERS: [DialogueMatcher; 7] = [
    DialogueMatcher {
        name: "colon",
        template: r#"({names})[^\n"]*?[\s:]+"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "said",
        template: r#"({names})[^\n"]*?\bsaid[^\n"]*?"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "asked",
        template: r#"({names})[^\n"]*?\basked[^\n"]*?"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "replied",
        template: r#"({names})[^\n"]*?\breplied[^\n"]*?"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "whispered",
        template: r#"({names})[^\n"]*?\bwhispered[^\n"]*?"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "shouted",
        template: r#"({names})[^\n"]*?\bshouted[^\n"]*?"([^"]+)""#,
        order: CaptureOrder::SpeakerFirst,
    },
    DialogueMatcher {
        name: "trailing_speaker",
        template: r#""([^"]+)"[^\n]*?({names})"#,
        order: CaptureOrder::TextFirst,
    },
];

impl DialogueMatcher {
    /// 代入两个角色名并编译（大小写不敏感）
    ///
    /// 较长的名字排在分支前面，避免 `Ann` 抢先匹配 `Anna`
    pub fn compile(&self, char1: &str, char2: &str) -> Result<Regex, regex::Error> {
        let (longer, shorter) = if char_len(char2) > char_len(char1) {
            (char2, char1)
        } else {
            (char1, char2)
        };
        let names = format!("{}|{}", regex::escape(longer), regex::escape(shorter));
        let pattern = format!("(?is){}", self.template.replace(NAMES_PLACEHOLDER, &names));
        Regex::new(&pattern)
    }

    fn roles<'t>(&self, caps: &Captures<'t>) -> Option<(&'t str, &'t str)> {
        let first = caps.get(1)?.as_str();
        let second = caps.get(2)?.as_str();
        match self.order {
            CaptureOrder::SpeakerFirst => Some((first, second)),
            CaptureOrder::TextFirst => Some((second, first)),
        }
    }

    /// 在片段中查找本规则的所有匹配（未去重）
    ///
    /// 过短的对白被丢弃，过长的对白被截断
    pub fn find(&self, fragment: &str, char1: &str, char2: &str) -> Vec<Dialogue> {
        let regex = match self.compile(char1, char2) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!(matcher = self.name, error = %e, "Skipping dialogue matcher");
                return Vec::new();
            }
        };

        regex
            .captures_iter(fragment)
            .filter_map(|caps| {
                let (speaker, text) = self.roles(&caps)?;
                let speaker = speaker.trim();
                if speaker.is_empty() {
                    return None;
                }
                let text = text.trim();
                if char_len(text) <= MIN_DIALOGUE_CHARS {
                    return None;
                }
                Some(Dialogue::new(
                    canonical_speaker(speaker, char1, char2),
                    truncate_chars(text, MAX_DIALOGUE_CHARS),
                ))
            })
            .collect()
    }
}

/// 匹配时大小写不敏感，输出时使用调用方提供的原始拼写
fn canonical_speaker<'a>(matched: &'a str, char1: &'a str, char2: &'a str) -> &'a str {
    let lowered = matched.to_lowercase();
    if lowered == char1.to_lowercase() {
        char1
    } else if lowered == char2.to_lowercase() {
        char2
    } else {
        matched
    }
}

/// 提取片段中的对白
///
/// 1. 依次应用全部匹配规则，收集所有匹配
/// 2. 以 (speaker, 前 50 字符) 去重，保留首次出现的位置
/// 3. 最多返回 4 条；没有匹配时返回空列表
pub fn extract_dialogues(fragment: &str, char1: &str, char2: &str) -> Vec<Dialogue> {
    let found = DIALOGUE_MATCHERS
        .iter()
        .flat_map(|matcher| matcher.find(fragment, char1, char2));

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::new();

    for dialogue in found {
        let key = (
            dialogue.speaker().to_string(),
            truncate_chars(dialogue.text(), DEDUP_PREFIX_CHARS).to_string(),
        );
        if seen.insert(key) {
            unique.push(dialogue);
            if unique.len() >= MAX_SCENE_DIALOGUES {
                break;
            }
        }
    }

    unique
}
