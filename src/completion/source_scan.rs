//! Header-arg discovery by mining a handler's elisp definition.
//!
//! Babel executors and dynamic block writers receive their header arguments
//! through one "parameters object" argument and read individual keys with a
//! small set of access idioms. This module locates that binding in the
//! definition's lambda list and then scans the body for the idioms:
//!
//! - `(plist-get BINDING KEY)`
//! - `(alist-get KEY BINDING)`
//! - `(assq KEY BINDING)`
//!
//! This is deliberately a pattern scan over flattened text, not an elisp
//! parser. An access expression only matches when the whole call is textually
//! contiguous after whitespace-joining; arguments that are commented out or
//! interleaved with unrelated parentheses can produce false positives or
//! misses. That envelope is accepted: full-language parsing would be
//! disproportionate for a best-effort completion source.

use memchr::memmem;

use crate::types::BlockKind;

/// Chars that may make up a mined key token.
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-')
}

/// Extract header-arg keys from a handler definition, in first-appearance
/// order. Empty when the definition doesn't match any accepted shape or the
/// binding is never accessed through a known idiom.
pub fn extract_parameter_keys(definition: &str, kind: BlockKind) -> Vec<String> {
    let flat = flatten(definition);
    let Some(binding) = parameters_binding(&flat, kind) else {
        return Vec::new();
    };
    scan_binding_accesses(&flat, &binding)
}

/// Join all whitespace runs to single spaces so the idiom patterns can match
/// across line breaks and indentation.
fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The formal parameter names of the first recognizable function definition
/// in `flat` (already whitespace-flattened text).
///
/// Accepted shapes: `(defun NAME (ARGS) …)`, the legacy keyword-argument
/// forms `(cl-defun NAME (ARGS) …)` / `(defun* NAME (ARGS) …)`, and anonymous
/// `(lambda (ARGS) …)`. Lambda-list markers (`&optional`, `&rest`, `&key`)
/// are skipped; a `(arg default)` entry contributes its first token.
fn formal_parameters(flat: &str) -> Option<Vec<String>> {
    // Earliest definition header wins.
    let header = ["(defun* ", "(cl-defun ", "(defun ", "(lambda "]
        .iter()
        .filter_map(|h| memmem::find(flat.as_bytes(), h.as_bytes()).map(|pos| (pos, *h)))
        .min_by_key(|(pos, _)| *pos)?;
    let (pos, matched) = header;

    let mut rest = &flat[pos + matched.len()..];
    if !matched.starts_with("(lambda") {
        // Named forms carry the function name before the lambda list.
        let name_end = rest.find([' ', '('])?;
        rest = rest[name_end..].trim_start();
    }
    if !rest.starts_with('(') {
        return None;
    }

    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut token = String::new();
    let mut nested_taken = false;
    for c in rest.chars() {
        match c {
            '(' => {
                depth += 1;
                nested_taken = false;
            }
            ')' | ' ' => {
                if !token.is_empty() {
                    // Top-level tokens are parameter names; inside a nested
                    // `(arg default)` pair only the first token is one.
                    let take = depth == 1 || (depth == 2 && !nested_taken);
                    if depth >= 2 {
                        nested_taken = true;
                    }
                    if take && !token.starts_with('&') {
                        params.push(std::mem::take(&mut token));
                    } else {
                        token.clear();
                    }
                }
                if c == ')' {
                    if depth == 1 {
                        return Some(params);
                    }
                    depth -= 1;
                }
            }
            _ => token.push(c),
        }
    }
    None
}

/// Pick the parameters-object binding from a definition, per block kind.
///
/// Convention (best effort, documented rather than guessed around):
/// - `Typed` — executors follow `(defun org-babel-execute:LANG (body params))`;
///   the binding is the last declared parameter.
/// - `Dynamic` — writers follow `(defun org-dblock-write:NAME (params))`,
///   sometimes with a trailing export-backend argument; the binding is the
///   second-to-last parameter, or the last when only one is declared.
///
/// Handlers that deviate from these shapes silently yield no source-derived
/// candidates.
fn parameters_binding(flat: &str, kind: BlockKind) -> Option<String> {
    let params = formal_parameters(flat)?;
    let pick = match kind {
        BlockKind::Typed => params.last(),
        BlockKind::Dynamic if params.len() >= 2 => params.get(params.len() - 2),
        BlockKind::Dynamic => params.last(),
    };
    pick.cloned()
}

/// Scan `flat` (whitespace-flattened text) for the three access idioms
/// against `binding` and collect the accessed keys, deduplicated, in
/// first-appearance order.
pub fn scan_binding_accesses(flat: &str, binding: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    // (plist-get BINDING KEY)
    let plist_pat = format!("(plist-get {binding} ");
    for pos in memmem::find_iter(flat.as_bytes(), plist_pat.as_bytes()) {
        if let Some(key) = key_token_at(flat, pos + plist_pat.len()) {
            found.push((pos, key));
        }
    }

    // (alist-get KEY BINDING) and (assq KEY BINDING)
    for head in ["(alist-get ", "(assq "] {
        for pos in memmem::find_iter(flat.as_bytes(), head.as_bytes()) {
            let Some(key) = key_token_at(flat, pos + head.len()) else {
                continue;
            };
            let after = pos + head.len() + key.len();
            if second_arg_is(flat, after, binding) {
                found.push((pos, key));
            }
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut keys = Vec::new();
    for (_, key) in found {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Read a key token starting at byte offset `at`; `None` when empty or when
/// it isn't followed by a space or closing paren.
fn key_token_at(flat: &str, at: usize) -> Option<String> {
    let rest = flat.get(at..)?;
    let key: String = rest.chars().take_while(|c| is_key_char(*c)).collect();
    if key.is_empty() {
        return None;
    }
    match rest[key.len()..].chars().next() {
        None | Some(' ') | Some(')') => Some(key),
        Some(_) => None,
    }
}

/// Whether the argument after byte offset `at` is exactly `binding`.
fn second_arg_is(flat: &str, at: usize, binding: &str) -> bool {
    let Some(rest) = flat.get(at..) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix(' ') else {
        return false;
    };
    match rest.strip_prefix(binding) {
        Some(tail) => matches!(tail.chars().next(), None | Some(')') | Some(' ')),
        None => false,
    }
}
