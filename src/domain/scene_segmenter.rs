//! 场景分割器
//!
//! 将模型生成的整段故事切分为固定数量的场景：
//! 1. 优先按文本中的场景标记（`SCENE 1:`、`### Scene`、`**1.**`）切分
//! 2. 没有标记时按段落平均分组
//! 3. 每个场景提取对白，提取不到时使用回退对白
//! 4. 场景不足时补齐合成场景，超出时截断

use std::sync::LazyLock;

use regex::Regex;

use super::dialogue_extractor::extract_dialogues;
use super::story::{Dialogue, Scene};
use super::text::{normalize_newlines, truncate_chars};

/// 场景描述最大字符数
pub const MAX_DESCRIPTION_CHARS: usize = 600;

/// 场景标记（大小写不敏感）
static SCENE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SCENE\s+\d+:|###\s*Scene|\*\*\d+\.\*\*").expect("valid regex")
});

/// 合成场景描述模板中的场景序号占位符
const SCENE_NUMBER_PLACEHOLDER: &str = "{n}";

/// 回退内容表
///
/// - `scene_lines`: 按场景序号索引的对白对（角色1台词, 角色2台词），
///   序号超出表长时使用最后一项
/// - `continuation_lines`: 合成场景使用的对白对
/// - `continuation_template`: 合成场景描述，`{n}` 替换为场景序号（从 1 开始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    scene_lines: Vec<(String, String)>,
    continuation_lines: (String, String),
    continuation_template: String,
}

impl FallbackTable {
    pub fn new(
        scene_lines: Vec<(String, String)>,
        continuation_lines: (String, String),
        continuation_template: impl Into<String>,
    ) -> Result<Self, &'static str> {
        if scene_lines.is_empty() {
            return Err("回退对白表不能为空");
        }
        let continuation_template = continuation_template.into();
        if continuation_template.trim().is_empty() {
            return Err("合成场景描述不能为空");
        }
        Ok(Self {
            scene_lines,
            continuation_lines,
            continuation_template,
        })
    }

    /// 第 `index` 个场景（从 0 开始）的回退对白
    pub fn scene_dialogues(&self, index: usize, char1: &str, char2: &str) -> Vec<Dialogue> {
        let idx = index.min(self.scene_lines.len() - 1);
        let (first, second) = &self.scene_lines[idx];
        vec![Dialogue::new(char1, first.as_str()), Dialogue::new(char2, second.as_str())]
    }

    /// 合成场景的对白
    pub fn continuation_dialogues(&self, char1: &str, char2: &str) -> Vec<Dialogue> {
        let (first, second) = &self.continuation_lines;
        vec![Dialogue::new(char1, first.as_str()), Dialogue::new(char2, second.as_str())]
    }

    /// 合成场景的描述，`number` 从 1 开始
    pub fn continuation_description(&self, number: usize) -> String {
        self.continuation_template
            .replace(SCENE_NUMBER_PLACEHOLDER, &number.to_string())
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
        Self {
            scene_lines: vec![
                pair(
                    "This place holds ancient secrets. We must proceed carefully.",
                    "I sense great power here. Stay vigilant.",
                ),
                pair(
                    "The path ahead grows darker. Are you ready?",
                    "Together we can face any challenge.",
                ),
                pair(
                    "Something is not right. I can feel it.",
                    "Trust your instincts. We need to be prepared.",
                ),
                pair(
                    "The final challenge awaits us ahead.",
                    "This is what we have trained for. Let us finish this.",
                ),
                pair(
                    "We have come so far. We cannot fail now.",
                    "Victory is within reach. Stay focused.",
                ),
            ],
            continuation_lines: pair("Our quest continues forward.", "Indeed, we must not waver."),
            continuation_template: "Scene {n} continues the epic journey.".to_string(),
        }
    }
}

/// 标记扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerScan {
    /// 第一个标记之前，内容丢弃
    Preamble,
    /// 位于某个标记之后，`start` 为内容起始字节位置
    Content { start: usize },
}

/// 按场景标记切分
///
/// 返回 `None` 表示文本中没有任何标记
fn split_on_markers(raw: &str) -> Option<Vec<&str>> {
    let mut state = MarkerScan::Preamble;
    let mut fragments = Vec::new();

    for marker in SCENE_MARKER.find_iter(raw) {
        state = match state {
            MarkerScan::Preamble => MarkerScan::Content { start: marker.end() },
            MarkerScan::Content { start } => {
                fragments.push(&raw[start..marker.start()]);
                MarkerScan::Content { start: marker.end() }
            }
        };
    }

    match state {
        MarkerScan::Preamble => None,
        MarkerScan::Content { start } => {
            fragments.push(&raw[start..]);
            Some(fragments)
        }
    }
}

/// 按空行切分段落，每段去除首尾空白
fn split_paragraphs(raw: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }

    paragraphs
}

/// 按段落平均分组
///
/// 每组 `max(1, 段落数 / 场景数)` 段，最后一组吸收剩余全部段落；
/// 段落用尽后不再产生分组
fn group_paragraphs(paragraphs: &[String], target_count: usize) -> Vec<String> {
    let per_scene = (paragraphs.len() / target_count).max(1);
    let mut groups = Vec::new();

    for i in 0..target_count {
        let start = i * per_scene;
        if start >= paragraphs.len() {
            break;
        }
        let end = if i + 1 == target_count {
            paragraphs.len()
        } else {
            (start + per_scene).min(paragraphs.len())
        };
        groups.push(paragraphs[start..end].join("\n\n"));
    }

    groups
}

/// 场景分割器
#[derive(Debug, Clone, Default)]
pub struct SceneSegmenter {
    fallback: FallbackTable,
}

impl SceneSegmenter {
    pub fn new(fallback: FallbackTable) -> Self {
        Self { fallback }
    }

    /// 将故事文本切分为恰好 `target_count` 个场景
    ///
    /// `target_count` 为 0 时返回空列表，调用方负责保证至少为 1
    pub fn segment(&self, raw: &str, target_count: usize, char1: &str, char2: &str) -> Vec<Scene> {
        if target_count == 0 {
            return Vec::new();
        }

        let normalized = normalize_newlines(raw);
        let raw = normalized.as_ref();
        let fragments: Vec<String> = match split_on_markers(raw) {
            Some(parts) => {
                tracing::debug!(markers = parts.len(), "Splitting story on scene markers");
                parts
                    .into_iter()
                    .take(target_count)
                    .map(str::to_string)
                    .collect()
            }
            None => {
                let paragraphs = split_paragraphs(raw);
                tracing::debug!(
                    paragraphs = paragraphs.len(),
                    "No scene markers found, grouping paragraphs"
                );
                group_paragraphs(&paragraphs, target_count)
            }
        };

        let mut scenes: Vec<Scene> = fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| self.build_scene(index, fragment, char1, char2))
            .collect();

        if scenes.len() < target_count {
            tracing::debug!(
                produced = scenes.len(),
                target = target_count,
                "Padding with synthetic scenes"
            );
        }
        while scenes.len() < target_count {
            let number = scenes.len() + 1;
            scenes.push(Scene::assemble(
                self.fallback.continuation_description(number),
                self.fallback.continuation_dialogues(char1, char2),
            ));
        }
        scenes.truncate(target_count);

        scenes
    }

    fn build_scene(&self, index: usize, fragment: &str, char1: &str, char2: &str) -> Scene {
        let trimmed = fragment.trim();
        let description = if trimmed.is_empty() {
            self.fallback.continuation_description(index + 1)
        } else {
            truncate_chars(trimmed, MAX_DESCRIPTION_CHARS).to_string()
        };

        let mut dialogues = extract_dialogues(fragment, char1, char2);
        if dialogues.is_empty() {
            dialogues = self.fallback.scene_dialogues(index, char1, char2);
        }

        Scene::assemble(description, dialogues)
    }
}

/// 使用默认回退表分割（便捷方法）
pub fn segment_scenes(raw: &str, target_count: usize, char1: &str, char2: &str) -> Vec<Scene> {
    SceneSegmenter::default().segment(raw, target_count, char1, char2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptions(scenes: &[Scene]) -> Vec<&str> {
        scenes.iter().map(|s| s.description()).collect()
    }

    #[test]
    fn test_marker_split_takes_priority() {
        let raw = "The Lost Keep\n\nSCENE 1: The gate was shut.\n\nIt was cold.\nSCENE 2: The hall echoed.\nSCENE 3: The tower fell.";
        let scenes = segment_scenes(raw, 3, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec!["The gate was shut.\n\nIt was cold.", "The hall echoed.", "The tower fell."]
        );
    }

    #[test]
    fn test_marker_variants() {
        let raw = "**1.** The gate was shut.\nscene 2: The hall echoed.\n### Scene The tower fell.";
        let scenes = segment_scenes(raw, 3, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec!["The gate was shut.", "The hall echoed.", "The tower fell."]
        );
    }

    #[test]
    fn test_extra_marker_fragments_dropped() {
        let raw = "SCENE 1: One.\nSCENE 2: Two.\nSCENE 3: Three.\nSCENE 4: Four.";
        let scenes = segment_scenes(raw, 2, "Aria", "Boros");
        assert_eq!(descriptions(&scenes), vec!["One.", "Two."]);
    }

    #[test]
    fn test_paragraph_fallback_even_groups() {
        let raw = "P1\n\nP2\n\nP3\n\nP4\n\nP5\n\nP6";
        let scenes = segment_scenes(raw, 3, "Aria", "Boros");
        assert_eq!(descriptions(&scenes), vec!["P1\n\nP2", "P3\n\nP4", "P5\n\nP6"]);
    }

    #[test]
    fn test_paragraph_remainder_goes_to_last_scene() {
        let raw = "P1\n\nP2\n\nP3\n\nP4\n\nP5\n\nP6\n\nP7";
        let scenes = segment_scenes(raw, 3, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec!["P1\n\nP2", "P3\n\nP4", "P5\n\nP6\n\nP7"]
        );
    }

    #[test]
    fn test_fewer_paragraphs_than_scenes_padded() {
        let raw = "P1\n\n\n\nP2";
        let scenes = segment_scenes(raw, 3, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec!["P1", "P2", "Scene 3 continues the epic journey."]
        );
        assert_eq!(scenes[2].dialogues()[0].text(), "Our quest continues forward.");
        assert_eq!(scenes[2].dialogues()[1].speaker(), "Boros");
    }

    #[test]
    fn test_empty_text_fully_synthetic() {
        let scenes = segment_scenes("", 2, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec![
                "Scene 1 continues the epic journey.",
                "Scene 2 continues the epic journey."
            ]
        );
        for scene in &scenes {
            assert_eq!(scene.dialogues().len(), 2);
        }
    }

    #[test]
    fn test_zero_target_returns_nothing() {
        assert!(segment_scenes("SCENE 1: One.", 0, "Aria", "Boros").is_empty());
    }

    #[test]
    fn test_always_exact_count_and_dialogue_bounds() {
        let inputs = [
            "",
            "Just one line.",
            "SCENE 1: Aria said, \"We must go now.\"",
            "A\n\nB\n\nC\n\nD\n\nE\n\nF\n\nG\n\nH\n\nI\n\nJ\n\nK",
            "SCENE 1:\nSCENE 2:\nSCENE 3:",
        ];
        for raw in inputs {
            for target in 1..=7 {
                let scenes = segment_scenes(raw, target, "Aria", "Boros");
                assert_eq!(scenes.len(), target, "raw={:?} target={}", raw, target);
                for scene in &scenes {
                    assert!(!scene.description().is_empty());
                    assert!((1..=4).contains(&scene.dialogues().len()));
                }
            }
        }
    }

    #[test]
    fn test_extracted_dialogues_used() {
        let raw = "SCENE 1: Aria said, \"We must go now.\"\nSCENE 2: Silence.";
        let scenes = segment_scenes(raw, 2, "Aria", "Boros");
        assert_eq!(scenes[0].dialogues(), &[Dialogue::new("Aria", "We must go now.")]);
        // 第二个场景没有对白，使用第 2 项回退对白
        assert_eq!(
            scenes[1].dialogues()[0].text(),
            "The path ahead grows darker. Are you ready?"
        );
    }

    #[test]
    fn test_fallback_index_clamped_to_last_entry() {
        let raw = (1..=7)
            .map(|i| format!("SCENE {}: Quiet moment {}.", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let scenes = segment_scenes(&raw, 7, "Aria", "Boros");
        for scene in &scenes[4..] {
            assert_eq!(
                scene.dialogues()[0].text(),
                "We have come so far. We cannot fail now."
            );
        }
    }

    #[test]
    fn test_description_capped() {
        let raw = format!("SCENE 1: {}", "w".repeat(900));
        let scenes = segment_scenes(&raw, 1, "Aria", "Boros");
        assert_eq!(scenes[0].description().chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_empty_marker_fragment_gets_placeholder() {
        let scenes = segment_scenes("SCENE 1:\nSCENE 2: The hall.", 2, "Aria", "Boros");
        assert_eq!(scenes[0].description(), "Scene 1 continues the epic journey.");
        assert_eq!(scenes[1].description(), "The hall.");
    }

    #[test]
    fn test_custom_fallback_table() {
        let table = FallbackTable::new(
            vec![("Hold.".to_string(), "Wait.".to_string())],
            ("Onward.".to_string(), "Aye.".to_string()),
            "Part {n}.",
        )
        .expect("valid table");
        let segmenter = SceneSegmenter::new(table);
        let scenes = segmenter.segment("Nothing spoken here.", 2, "Aria", "Boros");
        assert_eq!(scenes[0].dialogues()[0].text(), "Hold.");
        assert_eq!(scenes[1].description(), "Part 2.");
        assert_eq!(scenes[1].dialogues()[1].text(), "Aye.");
    }

    #[test]
    fn test_fallback_table_rejects_empty() {
        let result = FallbackTable::new(
            Vec::new(),
            ("Onward.".to_string(), "Aye.".to_string()),
            "Part {n}.",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_split_on_markers_discards_preamble() {
        let parts = split_on_markers("Title\nSCENE 1: a\nSCENE 2: b").expect("markers");
        assert_eq!(parts, vec![" a\n", " b"]);
        assert!(split_on_markers("no markers here").is_none());
    }

    #[test]
    fn test_crlf_input_normalized() {
        let raw = "SCENE 1: The gate.\r\n\r\nIt was cold.\r\nSCENE 2: The hall.";
        let scenes = segment_scenes(raw, 2, "Aria", "Boros");
        assert_eq!(
            descriptions(&scenes),
            vec!["The gate.\n\nIt was cold.", "The hall."]
        );
    }
}
