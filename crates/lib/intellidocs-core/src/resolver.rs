//! Cursor-time symbol resolution.
//!
//! Turns the text around the cursor into an ordered list of lookup keys. The
//! nearest call expression comes first, the bare word under the cursor last.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Characters of context read before the word under the cursor.
pub const LOOKBEHIND_CHARS: usize = 100;
/// Characters of context read after the word under the cursor.
pub const LOOKAHEAD_CHARS: usize = 1;
/// Shorter call names are noise, e.g. `$(` or `_(`.
pub const MIN_CANDIDATE_CHARS: usize = 2;

const CANDIDATE_TRIM_CHARS: &[char] = &['.', '(', ')', '[', ']', ' '];

static CALL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"((?:[0-9_\].$)]+\.[a-z0-9_.$]+|[a-z0-9_.$]+))\s*\(")
        .case_insensitive(true)
        .build()
        .expect("valid call name pattern")
});

/// Lists lookup keys for the symbol at byte offset `cursor` in `buffer`.
///
/// Call names found before the cursor are returned nearest first. A dotted
/// name is followed by its last segment, and the word under the cursor closes
/// the list.
#[must_use]
pub fn resolve_candidates(buffer: &str, cursor: usize) -> Vec<String> {
    let word = word_at(buffer, cursor);
    let context = context_line(buffer, &word);

    let mut candidates = Vec::new();
    let calls: Vec<&str> = CALL_NAME
        .captures_iter(&context)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str())
        .collect();

    for call in calls.into_iter().rev() {
        let call = call.trim_matches(CANDIDATE_TRIM_CHARS);
        if call.chars().count() < MIN_CANDIDATE_CHARS {
            continue;
        }
        candidates.push(call.to_string());
        if let Some((_, member)) = call.rsplit_once('.') {
            candidates.push(member.to_string());
        }
    }

    let word = &buffer[word];
    if !word.is_empty() {
        candidates.push(word.to_string());
    }
    candidates
}

/// Byte range of the word containing `cursor`, empty when between words.
#[must_use]
pub fn word_at(buffer: &str, cursor: usize) -> Range<usize> {
    let mut cursor = cursor.min(buffer.len());
    while !buffer.is_char_boundary(cursor) {
        cursor -= 1;
    }

    let start = buffer[..cursor]
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_word_char(*ch))
        .last()
        .map_or(cursor, |(idx, _)| idx);
    let end = buffer[cursor..]
        .char_indices()
        .find(|(_, ch)| !is_word_char(*ch))
        .map_or(buffer.len(), |(idx, _)| cursor + idx);

    start..end
}

/// Last line of the window around `word`, prefixed with a space.
fn context_line(buffer: &str, word: &Range<usize>) -> String {
    let start = buffer[..word.start]
        .char_indices()
        .rev()
        .take(LOOKBEHIND_CHARS)
        .last()
        .map_or(word.start, |(idx, _)| idx);
    let end = buffer[word.end..]
        .char_indices()
        .nth(LOOKAHEAD_CHARS)
        .map_or(buffer.len(), |(idx, _)| word.end + idx);

    let window = buffer[start..end].trim();
    let last_line = window.rsplit('\n').next().unwrap_or_default();
    format!(" {last_line}")
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
