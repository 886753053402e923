/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block, which
/// handles all LSP protocol messages (initialize, didOpen, didChange,
/// didClose, completion, completionItem/resolve).
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract and store the workspace root path
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root) = workspace_root
            && let Ok(mut wr) = self.workspace_root.lock()
        {
            *wr = Some(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                completion_provider: Some(CompletionOptions {
                    // Documentation is attached lazily, on resolve.
                    resolve_provider: Some(true),
                    trigger_characters: Some(vec![
                        "+".to_string(),
                        ":".to_string(),
                        "\"".to_string(),
                    ]),
                    all_commit_characters: None,
                    work_done_progress_options: WorkDoneProgressOptions {
                        work_done_progress: None,
                    },
                    completion_item: None,
                }),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        // Fold the workspace manifest (if any) into the handler registry.
        match self.load_workspace_manifest() {
            Some(stats) => {
                tracing::info!(
                    handlers = stats.handlers,
                    common_args = stats.common_args,
                    packages = stats.packages,
                    "loaded workspace manifest"
                );
                self.log(
                    MessageType::INFO,
                    format!(
                        "orgblock-lsp initialized! Loaded {} handler(s), {} common arg(s), {} package note(s) from {}",
                        stats.handlers,
                        stats.common_args,
                        stats.packages,
                        crate::manifest::MANIFEST_NAME,
                    ),
                )
                .await;
            }
            None => {
                self.log(MessageType::INFO, "orgblock-lsp initialized!".to_string())
                    .await;
            }
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let uri = doc.uri.to_string();

        if let Ok(mut files) = self.open_files.lock() {
            files.insert(uri.clone(), doc.text);
        }

        self.log(MessageType::INFO, format!("Opened file: {}", uri))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        // Full sync: the last change carries the complete document.
        if let Some(change) = params.content_changes.into_iter().last()
            && let Ok(mut files) = self.open_files.lock()
        {
            files.insert(uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        if let Ok(mut files) = self.open_files.lock() {
            files.remove(&uri);
        }

        self.log(MessageType::INFO, format!("Closed file: {}", uri))
            .await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        self.handle_completion(params).await
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(self.handle_resolve(item))
    }
}
