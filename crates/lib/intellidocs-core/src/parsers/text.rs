//! Plain-text helpers shared by every extraction step.
//!
//! These functions work on raw markup with regular expressions, not on a
//! parsed document. A `<` without a later `>` is never treated as a tag, so
//! malformed markup degrades to literal text instead of swallowing the rest of
//! the fragment.

use std::sync::LazyLock;

use regex::Regex;

/// Display budget the editor shell uses for descriptions and parameters.
pub const DEFAULT_TRUNCATE_CHARS: usize = 160;

const ELLIPSIS: &str = "...";
const SENTENCE_MIN_CHARS: usize = 30;
const SENTENCE_MAX_CHARS: usize = 200;
const SENTENCE_END: &str = ". ";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]*>").expect("valid markup tag pattern"));

/// Converts an HTML snippet into a single line of plain text.
///
/// Whitespace runs collapse to one space, tags are removed, entities are
/// decoded, and the result is trimmed.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
    let stripped = MARKUP_TAG.replace_all(&collapsed, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

/// Shortens `text` to at most `max_chars` characters plus an ellipsis.
///
/// The cut only happens before a delimiter character, so a word is never
/// sliced. Text that already fits is returned unchanged.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .take(max_chars + 1)
        .filter(|(_, ch)| is_delimiter(*ch))
        .map(|(idx, _)| idx)
        .last()
        .unwrap_or(0);

    let mut output = text[..cut].trim_end_matches(is_trailing_noise).to_string();
    output.push_str(ELLIPSIS);
    output
}

/// Keeps the first sentence of a parameter description.
///
/// Looks for the shortest prefix of 30 to 200 characters followed by `". "`
/// and keeps it with its period. Anything else is returned whole.
#[must_use]
pub fn first_sentence(text: &str) -> String {
    for (position, (idx, _)) in text.char_indices().enumerate() {
        if position > SENTENCE_MAX_CHARS {
            break;
        }
        if position >= SENTENCE_MIN_CHARS && text[idx..].starts_with(SENTENCE_END) {
            return format!("{}.", &text[..idx]);
        }
    }
    text.to_string()
}

const fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>'
                | '"' | '/' | '|' | '，' | '。' | '、'
        )
}

const fn is_trailing_noise(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | '.' | '，' | '。' | '、')
}
