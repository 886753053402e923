//! Deferred documentation tests: nothing is rendered while the candidate
//! list is produced, and `completionItem/resolve` is where the thunk runs.

mod common;

use common::{complete, create_test_backend, items, open};
use orgblock_lsp::{Backend, BlockKind, HandlerInfo, Registry, TypeDescriptor};
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

fn sql_registry() -> Registry {
    let mut registry = Registry::empty();
    registry.register(
        BlockKind::Typed,
        "sql",
        HandlerInfo {
            package: Some("ob-sql".into()),
            definition: None,
            documentation: Some("Execute a block of Sql code with Babel.".into()),
            header_args: vec![(":engine".into(), TypeDescriptor::Atom("mysql".into()))],
        },
    );
    registry.set_commentary("ob-sql", "Original commentary.");
    registry
}

#[test]
fn test_documentation_reads_the_registry_only_when_rendered() {
    let backend = Backend::new_test_with_registry(sql_registry());
    let result = backend.complete_line("#+begin_src sql :", 17).unwrap();
    let candidate = result
        .candidates
        .iter()
        .find(|c| c.text == ":engine")
        .expect(":engine candidate");

    // Mutate the registry after the candidate was produced. If candidate
    // construction had rendered the doc eagerly, the old commentary would be
    // baked in; the thunk must observe the mutation instead.
    if let Ok(mut registry) = backend.registry_handle().lock() {
        registry.set_commentary("ob-sql", "Commentary written after resolution.");
    }

    let rendered = candidate.documentation.render();
    assert!(
        rendered.contains("Commentary written after resolution."),
        "doc should be assembled lazily, got: {rendered}"
    );
    assert!(!rendered.contains("Original commentary."));
}

#[test]
fn test_rendered_doc_composes_all_sections_in_order() {
    let backend = Backend::new_test_with_registry(sql_registry());
    let result = backend.complete_line("#+begin_src sql :", 17).unwrap();
    let rendered = result.candidates[0].documentation.render();

    let type_pos = rendered.find("Type: mysql").expect("type section");
    let commentary_pos = rendered.find("Original commentary.").expect("commentary");
    let function_pos = rendered
        .find("Function: org-babel-execute:sql")
        .expect("function header");
    let doc_pos = rendered
        .find("Execute a block of Sql code with Babel.")
        .expect("docstring");
    assert!(type_pos < commentary_pos);
    assert!(commentary_pos < function_pos);
    assert!(function_pos < doc_pos);
    assert!(rendered.contains("---"), "sections are separated by a rule");
}

#[test]
fn test_missing_pieces_are_omitted_not_errors() {
    let mut registry = Registry::empty();
    // No package, no docstring, no commentary — only the function header
    // remains, and rendering still succeeds.
    registry.register(BlockKind::Dynamic, "burndown", HandlerInfo::default());
    let backend = Backend::new_test_with_registry(registry);

    let candidates = backend
        .complete_line("#+begin: burn", 13)
        .unwrap()
        .candidates;
    let rendered = candidates[0].documentation.render();
    assert_eq!(rendered, "Function: org-dblock-write:burndown");
}

#[tokio::test]
async fn test_completion_items_carry_no_documentation() {
    let backend = create_test_backend();
    let uri = "file:///lazy.org";
    open(&backend, uri, "#+begin_src sql :\n").await;

    let items = items(complete(&backend, uri, 0, 17).await.unwrap());
    assert!(!items.is_empty());
    assert!(
        items.iter().all(|i| i.documentation.is_none()),
        "completion must not render documentation eagerly"
    );
    assert!(
        items.iter().all(|i| i.data.is_some()),
        "items need a resolve payload"
    );
}

#[tokio::test]
async fn test_resolve_attaches_documentation() {
    let backend = create_test_backend();
    let uri = "file:///lazy.org";
    open(&backend, uri, "#+begin_src sql :\n").await;

    let items = items(complete(&backend, uri, 0, 17).await.unwrap());
    let engine = items
        .iter()
        .find(|i| i.label == ":engine")
        .expect(":engine item")
        .clone();

    let resolved = backend.completion_resolve(engine).await.unwrap();
    match resolved.documentation {
        Some(Documentation::MarkupContent(content)) => {
            assert_eq!(content.kind, MarkupKind::Markdown);
            assert!(content.value.contains("Function: org-babel-execute:sql"));
            assert!(content.value.contains("One of: mysql, postgresql"));
        }
        other => panic!("expected markup documentation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_without_payload_is_a_no_op() {
    let backend = create_test_backend();
    let item = CompletionItem {
        label: "stray".to_string(),
        ..CompletionItem::default()
    };
    let resolved = backend.completion_resolve(item).await.unwrap();
    assert!(resolved.documentation.is_none());
}
