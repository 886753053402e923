#![allow(dead_code)]

use orgblock_lsp::Backend;
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

pub fn create_test_backend() -> Backend {
    Backend::new_test()
}

/// Open a document on the backend with the given text.
pub async fn open(backend: &Backend, uri: &str, text: &str) {
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: Url::parse(uri).unwrap(),
                language_id: "org".to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

/// Request completion at (line, character) in a previously opened document.
pub async fn complete(
    backend: &Backend,
    uri: &str,
    line: u32,
    character: u32,
) -> Option<CompletionResponse> {
    backend
        .completion(CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: Url::parse(uri).unwrap(),
                },
                position: Position { line, character },
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
            context: None,
        })
        .await
        .unwrap()
}

/// Unwrap an Array completion response.
pub fn items(response: CompletionResponse) -> Vec<CompletionItem> {
    match response {
        CompletionResponse::Array(items) => items,
        CompletionResponse::List(list) => list.items,
    }
}

pub fn labels(items: &[CompletionItem]) -> Vec<String> {
    items.iter().map(|i| i.label.clone()).collect()
}
