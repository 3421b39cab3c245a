//! 文本工具
//!
//! 所有长度均按字符（Unicode scalar）计算，不按字节

use std::borrow::Cow;

/// 将 `\r\n` 与单独的 `\r` 统一为 `\n`
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// 截断到最多 `max_chars` 个字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// 字符数
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
