/// Utility functions for the orgblock LSP server.
///
/// This module contains helper methods for extracting the line under the
/// cursor, locating the replaceable token around it, and logging to the
/// client.
use tower_lsp::lsp_types::*;

use crate::Backend;

/// Characters that may appear in the token being replaced by a completion:
/// handler names (`emacs-lisp`), header-arg keys (`:results`) and
/// filename-like values (`../out/plot.png`, `~/notes`).
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ':' | '-' | '_' | '.' | '/' | '~')
}

/// Bounds (char offsets) of the token around `cursor` in `line`.
///
/// Returns an empty range at the cursor when no token chars surround it.
pub fn token_bounds_at(line: &str, cursor: usize) -> (usize, usize) {
    let chars: Vec<char> = line.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut start = cursor;
    while start > 0 && is_token_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = cursor;
    while end < chars.len() && is_token_char(chars[end]) {
        end += 1;
    }
    (start, end)
}

impl Backend {
    /// The text of line `line_idx` in `content`, if it exists.
    pub(crate) fn line_at(content: &str, line_idx: usize) -> Option<&str> {
        content.lines().nth(line_idx)
    }

    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }
}
