//! Block-name completion through the LSP surface: babel languages after
//! `#+begin_src`, dynamic block writers after `#+begin:`.

mod common;

use common::{complete, create_test_backend, items, labels, open};
use tower_lsp::lsp_types::*;

#[tokio::test]
async fn test_src_marker_lists_babel_languages() {
    let backend = create_test_backend();
    let uri = "file:///notes.org";
    open(&backend, uri, "* Notes\n#+begin_src \n#+end_src\n").await;

    let result = complete(&backend, uri, 1, 12).await.expect("should complete");
    let items = items(result);
    let names = labels(&items);
    for expected in ["emacs-lisp", "python", "shell", "sql"] {
        assert!(
            names.iter().any(|n| n == expected),
            "missing language {:?} in {:?}",
            expected,
            names
        );
    }
    // Dynamic block writers must not leak into the language listing.
    assert!(!names.iter().any(|n| n == "clocktable"), "got: {:?}", names);
}

#[tokio::test]
async fn test_partial_language_filters_the_listing() {
    let backend = create_test_backend();
    let uri = "file:///notes.org";
    open(&backend, uri, "#+begin_src s\n").await;

    let names = labels(&items(complete(&backend, uri, 0, 13).await.unwrap()));
    assert_eq!(names, vec!["shell", "sql"]);
}

#[tokio::test]
async fn test_dynamic_marker_lists_writers() {
    let backend = create_test_backend();
    let uri = "file:///notes.org";
    open(&backend, uri, "#+begin: \n").await;

    let items = items(complete(&backend, uri, 0, 9).await.unwrap());
    assert_eq!(labels(&items), vec!["clocktable", "columnview"]);
    assert_eq!(items[0].detail.as_deref(), Some("dynamic block"));
    assert_eq!(items[0].kind, Some(CompletionItemKind::MODULE));
}

#[tokio::test]
async fn test_items_replace_the_partial_name() {
    let backend = create_test_backend();
    let uri = "file:///notes.org";
    open(&backend, uri, "#+begin_src py\n").await;

    let items = items(complete(&backend, uri, 0, 14).await.unwrap());
    let python = items.iter().find(|i| i.label == "python").expect("python");
    match python.text_edit.as_ref().expect("text edit") {
        CompletionTextEdit::Edit(edit) => {
            assert_eq!(edit.new_text, "python");
            assert_eq!(edit.range.start, Position { line: 0, character: 12 });
            assert_eq!(edit.range.end, Position { line: 0, character: 14 });
        }
        other => panic!("expected plain edit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_header_lines_complete_to_nothing() {
    let backend = create_test_backend();
    let uri = "file:///notes.org";
    open(&backend, uri, "Plain prose line.\n#+begin_src sql :dir x\n").await;

    assert!(complete(&backend, uri, 0, 5).await.is_none());
    // Position on a line past the end of the document.
    assert!(complete(&backend, uri, 9, 0).await.is_none());
}

#[tokio::test]
async fn test_unopened_document_completes_to_nothing() {
    let backend = create_test_backend();
    assert!(complete(&backend, "file:///nowhere.org", 0, 0).await.is_none());
}
