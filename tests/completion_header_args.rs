//! Parameter-key resolution tests: the schema → source → doc waterfall, the
//! always-additive common tier, and dedup precedence.

mod common;

use common::{complete, items, labels, open};
use orgblock_lsp::types::Provenance;
use orgblock_lsp::{Backend, BlockKind, HandlerInfo, Registry, TypeDescriptor};

fn handler(
    definition: Option<&str>,
    documentation: Option<&str>,
    header_args: Vec<(&str, TypeDescriptor)>,
) -> HandlerInfo {
    HandlerInfo {
        package: None,
        definition: definition.map(str::to_string),
        documentation: documentation.map(str::to_string),
        header_args: header_args
            .into_iter()
            .map(|(k, d)| (k.to_string(), d))
            .collect(),
    }
}

#[test]
fn test_handler_naming_conventions() {
    assert_eq!(
        Registry::handler_function(BlockKind::Typed, "sql"),
        "org-babel-execute:sql"
    );
    assert_eq!(
        Registry::handler_function(BlockKind::Dynamic, "clocktable"),
        "org-dblock-write:clocktable"
    );
    assert_eq!(Registry::schema_table_name("sql"), "org-babel-header-args:sql");
}

// ─── Tier waterfall ─────────────────────────────────────────────────────────

#[test]
fn test_native_schema_wins_over_source_and_doc() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "sql",
        handler(
            Some("(defun org-babel-execute:sql (body params) (assq :from-source params))"),
            Some("Mentions :fromdoc in prose."),
            vec![(":engine", TypeDescriptor::Any)],
        ),
    );
    let backend = Backend::new_test_with_registry(registry);

    let result = backend
        .complete_line("#+begin_src sql :", 17)
        .expect("header should complete");
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":engine"]);
    assert_eq!(result.candidates[0].provenance, Provenance::Native);
}

#[test]
fn test_source_tier_fills_in_when_schema_is_empty() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "shell",
        handler(
            Some(
                "(defun org-babel-execute:shell (body params)\n\
                 (assq :shebang params) (plist-get params :stdin))",
            ),
            Some("Mentions :fromdoc in prose."),
            vec![],
        ),
    );
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src shell :", 19).unwrap();
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":shebang", ":stdin"]);
    assert!(
        result
            .candidates
            .iter()
            .all(|c| c.provenance == Provenance::Source)
    );
    // Heuristic keys carry no declared value type.
    assert!(result.candidates.iter().all(|c| c.value_type.is_none()));
}

#[test]
fn test_doc_tier_is_the_last_resort() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "elisp",
        handler(None, Some("Set \u{2018}:lexical\u{2019} to taste."), vec![]),
    );
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src elisp :", 19).unwrap();
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":lexical"]);
    assert_eq!(result.candidates[0].provenance, Provenance::Doc);
}

#[test]
fn test_unknown_block_yields_only_common_args() {
    let mut registry = Registry::empty();
    registry.extend_common(vec![(":dir".to_string(), TypeDescriptor::Any)]);
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src nosuchlang :", 24).unwrap();
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":dir"]);
    assert_eq!(result.candidates[0].provenance, Provenance::Common);
}

// ─── The common tier is additive, not a fallback ────────────────────────────

#[test]
fn test_common_args_append_even_when_native_matched() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "sql",
        handler(None, None, vec![(":engine", TypeDescriptor::Any)]),
    );
    registry.extend_common(vec![(":results".to_string(), TypeDescriptor::Any)]);
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src sql :", 17).unwrap();
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":engine", ":results"]);
    assert_eq!(result.candidates[1].provenance, Provenance::Common);
}

#[test]
fn test_dynamic_blocks_do_not_receive_common_args() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Dynamic,
        "clocktable",
        handler(
            Some("(defun org-dblock-write:clocktable (params) (plist-get params :scope))"),
            None,
            vec![],
        ),
    );
    registry.extend_common(vec![(":results".to_string(), TypeDescriptor::Any)]);
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin: clocktable :", 21).unwrap();
    let texts: Vec<&str> = result.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec![":scope"]);
}

// ─── Dedup precedence ───────────────────────────────────────────────────────

#[test]
fn test_duplicate_across_tiers_keeps_the_earlier_provenance() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "shell",
        handler(
            Some("(defun org-babel-execute:shell (body params) (assq :dir params))"),
            None,
            vec![],
        ),
    );
    registry.extend_common(vec![(":dir".to_string(), TypeDescriptor::Any)]);
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src shell :", 19).unwrap();
    let dirs: Vec<&orgblock_lsp::Candidate> = result
        .candidates
        .iter()
        .filter(|c| c.text == ":dir")
        .collect();
    assert_eq!(dirs.len(), 1, "duplicate texts must collapse");
    assert_eq!(dirs[0].provenance, Provenance::Source);
}

#[test]
fn test_native_duplicate_of_common_key_keeps_native() {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "python",
        handler(None, None, vec![(":results", TypeDescriptor::Any)]),
    );
    registry.extend_common(vec![(":results".to_string(), TypeDescriptor::Any)]);
    let backend = Backend::new_test_with_registry(registry);

    let result = backend.complete_line("#+begin_src python :", 20).unwrap();
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.candidates[0].provenance, Provenance::Native);
}

// ─── Scenario: through the LSP surface ──────────────────────────────────────

#[tokio::test]
async fn test_common_key_annotation_over_lsp() {
    let mut registry = Registry::empty();
    registry.register(BlockKind::Typed, "sql", HandlerInfo::default());
    registry.extend_common(vec![(
        ":dir".to_string(),
        TypeDescriptor::Atom("dir".to_string()),
    )]);
    let backend = Backend::new_test_with_registry(registry);
    let uri = "file:///scenario.org";
    open(&backend, uri, "#+begin_src sql :\n").await;

    let items = items(complete(&backend, uri, 0, 17).await.expect("should complete"));
    assert_eq!(labels(&items), vec![":dir"]);
    assert_eq!(items[0].detail.as_deref(), Some("sql parameter (common)"));
    // Documentation stays unrendered until the item is resolved.
    assert!(items[0].documentation.is_none());
}
