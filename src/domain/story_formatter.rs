//! 故事排版
//!
//! 把模型输出整理成一段供阅读的正文：去掉场景标记和 `DIALOGUE:` 行，
//! 连续空行压缩为一个空行。与场景分割器相互独立，只读取原始文本。

use std::sync::LazyLock;

use regex::Regex;

use super::text::normalize_newlines;

/// 场景标记，冒号可省略（大小写不敏感）
static SCENE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SCENE\s+(\d+)[:\s]*").expect("valid regex"));

/// 以 `DIALOGUE:` 开头的整行
static DIALOGUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*DIALOGUE:[^\n]*(?:\n|\z)").expect("valid regex"));

/// 三个及以上连续换行
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn strip_dialogue_lines(text: &str) -> String {
    DIALOGUE_LINE.replace_all(text, "").into_owned()
}

fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

/// 排版故事文本
///
/// 0. 换行统一为 `\n`
/// 1. 按 `SCENE n:` 切分，第一个标记之前的内容丢弃
/// 2. 每段去掉 `DIALOGUE:` 行、压缩空行后依次拼接，段间空一行
/// 3. 没有任何有效场景时，直接清理全文
pub fn format_story(raw: &str) -> String {
    let normalized = normalize_newlines(raw);
    let raw = normalized.as_ref();
    let markers: Vec<_> = SCENE_MARKER.find_iter(raw).collect();
    let mut formatted = String::new();
    let mut scene_count = 0;

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(raw.len(), |next| next.start());
        let content = raw[marker.end()..end].trim();
        if content.is_empty() {
            continue;
        }
        scene_count += 1;

        let cleaned = collapse_blank_runs(&strip_dialogue_lines(content));
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            formatted.push_str(cleaned);
            formatted.push_str("\n\n");
        }
    }

    if scene_count == 0 {
        tracing::debug!(markers = markers.len(), "No scene content found, cleaning whole story");
        let without_markers = SCENE_MARKER.replace_all(raw, "");
        let cleaned = collapse_blank_runs(&strip_dialogue_lines(&without_markers));
        formatted.push_str(cleaned.trim());
    }

    formatted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_removed_and_blank_runs_collapsed() {
        let formatted = format_story("SCENE 1: Hello world.\n\n\n\nSCENE 2: Goodbye.");
        assert_eq!(formatted, "Hello world.\n\nGoodbye.");
    }

    #[test]
    fn test_idempotent() {
        let raw = "Preface\nSCENE 1: The gate.\n\n\n\nIt opened.\nSCENE 2:\nDIALOGUE: Aria: hi\nThe hall.";
        let once = format_story(raw);
        assert_eq!(format_story(&once), once);
    }

    #[test]
    fn test_preamble_dropped() {
        assert_eq!(format_story("The Lost Keep\nSCENE 1: Body text."), "Body text.");
    }

    #[test]
    fn test_dialogue_lines_removed() {
        let raw = "SCENE 1: The gate.\nDIALOGUE: Aria: \"Open it.\"\nThe end.";
        assert_eq!(format_story(raw), "The gate.\nThe end.");
    }

    #[test]
    fn test_inner_blank_runs_collapsed() {
        let raw = "SCENE 1: First.\n\n\n\n\nSecond.";
        assert_eq!(format_story(raw), "First.\n\nSecond.");
    }

    #[test]
    fn test_marker_without_colon_and_lowercase() {
        let raw = "scene 1 The gate.\nScene 2: The hall.";
        assert_eq!(format_story(raw), "The gate.\n\nThe hall.");
    }

    #[test]
    fn test_no_markers_cleans_whole_text() {
        let raw = "  Just a tale.\n\n\n\nThe end.\nDIALOGUE: x\n";
        assert_eq!(format_story(raw), "Just a tale.\n\nThe end.");
    }

    #[test]
    fn test_only_empty_scenes_fall_back_to_whole_text() {
        assert_eq!(format_story("Intro text.\nSCENE 1:\nSCENE 2:"), "Intro text.");
    }

    #[test]
    fn test_crlf_blank_runs_collapsed() {
        let raw = "SCENE 1: A\r\n\r\n\r\n\r\nB\r\nSCENE 2: C";
        assert_eq!(format_story(raw), "A\n\nB\n\nC");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_story(""), "");
        assert_eq!(format_story("   \n\n  "), "");
    }
}
