//! Head-and-tail ("smart") truncation of long texts.

use std::borrow::Cow;

use crate::config::EmbeddingConfig;

/// Separator placed between the kept head and tail.
pub const ELLIPSIS: &str = " ... ";

/// Character budget and head share used by [`smart_truncate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncationPolicy {
    pub max_chars: usize,
    pub head_ratio: f64,
}

impl TruncationPolicy {
    pub fn new(max_chars: usize, head_ratio: f64) -> Self {
        Self {
            max_chars,
            head_ratio,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(config.max_chars(), config.head_ratio)
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        smart_truncate(text, self.max_chars, self.head_ratio)
    }
}

/// Keep the start and the end of `text` when it exceeds `max_chars` characters.
///
/// The head is the first `head_ratio` share of the budget cut back to the last
/// space; the tail is the last remaining share cut forward past the first
/// space. Both are joined with `" ... "`. Texts within budget are borrowed
/// unchanged.
pub fn smart_truncate(text: &str, max_chars: usize, head_ratio: f64) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(text);
    }

    let head_chars = (max_chars as f64 * head_ratio) as usize;
    let tail_chars = (max_chars as f64 * (1.0 - head_ratio)) as usize;

    let head_end = byte_offset(text, head_chars);
    let head = &text[..head_end];
    let head = match head.rfind(' ') {
        Some(idx) => &head[..idx],
        None => head,
    };

    let tail = if tail_chars == 0 {
        ""
    } else {
        let tail = &text[byte_offset(text, total - tail_chars)..];
        match tail.find(' ') {
            Some(idx) => &tail[idx + 1..],
            None => tail,
        }
    };

    Cow::Owned(format!("{head}{ELLIPSIS}{tail}"))
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_borrowed() {
        let text = "ley de transparencia";
        let result = smart_truncate(text, 100, 0.7);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, text);
    }

    #[test]
    fn test_keeps_head_and_tail_on_word_boundaries() {
        // 20 words of 4 chars + 19 spaces = 99 chars.
        let words: Vec<String> = (0..20).map(|i| format!("w{i:03}")).collect();
        let text = words.join(" ");
        let result = smart_truncate(&text, 40, 0.7);

        // Head budget 28 chars ends inside "w005" and is cut back to "w004".
        // Tail budget 12 chars is "17 w018 w019", cut past the first space.
        assert_eq!(result, "w000 w001 w002 w003 w004 ... w018 w019");
    }

    #[test]
    fn test_no_spaces_keeps_raw_slices() {
        let text = "a".repeat(50);
        let result = smart_truncate(&text, 10, 0.7);
        assert_eq!(result, format!("{} ... {}", "a".repeat(7), "a".repeat(3)));
    }

    #[test]
    fn test_multibyte_characters_are_counted_as_chars() {
        let text = "ñandú ".repeat(20);
        let result = smart_truncate(&text, 30, 0.5);
        assert!(result.contains(ELLIPSIS));
        assert!(result.starts_with("ñandú"));
        assert!(result.chars().count() <= 30 + ELLIPSIS.len());
    }

    #[test]
    fn test_policy_from_config() {
        let policy = TruncationPolicy::from_config(&EmbeddingConfig::default());
        assert_eq!(policy.max_chars, 2048);
        let long = "palabra ".repeat(400);
        assert!(policy.apply(&long).chars().count() < long.chars().count());
    }
}
