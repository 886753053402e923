//! Header-line context classification.
//!
//! Given the text of one line and the cursor's char offset within it, decide
//! whether the line is a block header at all and, if so, what kind of token
//! is being typed: the block name, a `:key`, or the value following a key.
//!
//! ## Accepted header shapes
//!
//! - `#+begin_src LANG :key value …` — a babel source block (`Typed`)
//! - `#+begin: NAME :key value …` — a dynamic block (`Dynamic`)
//!
//! Both markers match case-insensitively and may be indented. Anything else
//! is not a header line and classifies to `None` — malformed input never
//! produces an error, only the absence of completions.

use crate::types::{BlockDescriptor, BlockKind, HeaderContext, Phase};

/// Quote glyphs that may open a value: `:file "…` or `:file '…`.
fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'')
}

/// Chars allowed in a header-arg key token (after the leading `:`).
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-')
}

/// Classify `line` against the cursor position.
///
/// Pure: same inputs always yield the same context. Returns `None` when the
/// line is not a block header or the cursor sits inside the opening marker.
pub fn classify_header_line(line: &str, cursor: usize) -> Option<HeaderContext> {
    let chars: Vec<char> = line.chars().collect();
    let cursor = cursor.min(chars.len());

    let indent = chars.iter().take_while(|c| c.is_whitespace()).count();
    let rest: String = chars[indent..].iter().collect();
    let lower = rest.to_lowercase();

    // Match the marker + discriminator. `#+begin_src` must be followed by
    // whitespace or end-of-line so `#+begin_srcfoo` doesn't classify.
    let (kind, marker_len) = if lower.starts_with("#+begin_src")
        && lower[11..].chars().next().is_none_or(|c| c.is_whitespace())
    {
        (BlockKind::Typed, 11)
    } else if lower.starts_with("#+begin:") {
        (BlockKind::Dynamic, 8)
    } else {
        return None;
    };

    let marker_end = indent + marker_len;
    if cursor < marker_end {
        // Cursor inside `#+begin_src` itself — nothing to complete here.
        return None;
    }

    // Locate the block name token.
    let mut name_start = marker_end;
    while name_start < chars.len() && chars[name_start].is_whitespace() {
        name_start += 1;
    }
    let mut name_end = name_start;
    while name_end < chars.len() && !chars[name_end].is_whitespace() {
        name_end += 1;
    }
    let name: String = chars[name_start..name_end].iter().collect();

    let block = BlockDescriptor { kind, name };

    // Empty name, or cursor within/immediately after the name token: the
    // block name itself is being completed.
    if block.name.is_empty() || cursor <= name_end {
        let prefix_end = cursor.clamp(name_start, name_end);
        let name_prefix: String = chars[name_start..prefix_end].iter().collect();
        return Some(HeaderContext {
            block,
            phase: Phase::BlockType,
            name_prefix,
            value_key: None,
        });
    }

    // Parameter region. Walk back from the cursor over the partial token the
    // user may have typed, then see whether a `:key` (plus whitespace and an
    // optional opening quote) immediately precedes it.
    let mut i = cursor;
    while i > name_end && !chars[i - 1].is_whitespace() && !is_quote(chars[i - 1]) {
        i -= 1;
    }
    let partial: String = chars[i..cursor].iter().collect();

    // A partial starting with `:` is a key being typed, never a value.
    if !partial.starts_with(':') {
        if let Some(key) = preceding_value_key(&chars, name_end, i) {
            return Some(HeaderContext {
                block,
                phase: Phase::ParameterValue,
                name_prefix: String::new(),
                value_key: Some(key),
            });
        }
    }

    Some(HeaderContext {
        block,
        phase: Phase::ParameterKey,
        name_prefix: String::new(),
        value_key: None,
    })
}

/// Look backwards from `pos` for `<key> <ws> <one optional quote>` and return
/// the key (without trailing whitespace/quote) when found.
fn preceding_value_key(chars: &[char], floor: usize, pos: usize) -> Option<String> {
    let mut i = pos;

    // One opening quote directly before the partial token is allowed.
    if i > floor && is_quote(chars[i - 1]) {
        i -= 1;
    }

    // At least one whitespace char between the key and the value position.
    let ws_end = i;
    while i > floor && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    if i == ws_end {
        return None;
    }

    // The key token itself, ending at `i`.
    let key_end = i;
    while i > floor && is_key_char(chars[i - 1]) {
        i -= 1;
    }
    let key: String = chars[i..key_end].iter().collect();
    if key.len() > 1 && key.starts_with(':') {
        Some(key)
    } else {
        None
    }
}
