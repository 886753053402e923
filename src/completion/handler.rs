//! Completion request orchestration.
//!
//! This module contains the `handle_completion` method called by
//! `LanguageServer::completion` and its counterpart `handle_resolve` for
//! `completionItem/resolve`. Candidates are produced by the engine
//! ([`Backend::complete_line`]); this layer only shapes them into LSP items.
//!
//! Documentation is deliberately absent from the initial items: each item
//! carries a small `data` payload instead, and the documentation thunk is
//! rebuilt and rendered only when the client asks to resolve a specific item.

use serde::{Deserialize, Serialize};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::completion::docgen;
use crate::types::{BlockKind, Candidate, Phase, TypeDescriptor};

/// Everything `completionItem/resolve` needs to rebuild a candidate's
/// documentation thunk. Round-trips through `CompletionItem.data` as JSON.
#[derive(Debug, Serialize, Deserialize)]
struct ResolveData {
    kind: BlockKind,
    block: String,
    phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    descriptor: Option<TypeDescriptor>,
}

impl Backend {
    /// Main completion handler — called by `LanguageServer::completion`.
    pub(crate) async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;

        let content = if let Ok(files) = self.open_files.lock() {
            files.get(&uri).cloned()
        } else {
            None
        };
        let Some(content) = content else {
            return Ok(None);
        };

        let Some(line) = Self::line_at(&content, position.line as usize) else {
            return Ok(None);
        };

        let Some(completion) = self.complete_line(line, position.character as usize) else {
            return Ok(None);
        };
        if completion.candidates.is_empty() {
            return Ok(None);
        }

        let Some((block_kind, block_name)) =
            context_block_name(line, position.character as usize)
        else {
            return Ok(None);
        };
        let range = Range {
            start: Position {
                line: position.line,
                character: completion.replace_start as u32,
            },
            end: Position {
                line: position.line,
                character: completion.replace_end as u32,
            },
        };

        let items: Vec<CompletionItem> = completion
            .candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| {
                build_item(candidate, completion.phase, block_kind, &block_name, range, idx)
            })
            .collect();

        Ok(Some(CompletionResponse::Array(items)))
    }

    /// `completionItem/resolve` handler: rebuild the documentation thunk from
    /// the item's `data` payload and render it. Items without a payload (or
    /// with one we no longer understand) are returned untouched.
    pub(crate) fn handle_resolve(&self, mut item: CompletionItem) -> CompletionItem {
        let Some(data) = item.data.take() else {
            return item;
        };
        let Ok(data) = serde_json::from_value::<ResolveData>(data) else {
            return item;
        };

        let thunk = match data.phase {
            Phase::BlockType => {
                docgen::handler_doc(self.registry.clone(), data.kind, data.block)
            }
            Phase::ParameterKey | Phase::ParameterValue => docgen::parameter_doc(
                self.registry.clone(),
                data.kind,
                data.block,
                data.descriptor,
            ),
        };
        let rendered = thunk.render();
        if !rendered.is_empty() {
            item.documentation = Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: rendered,
            }));
        }
        item
    }
}

/// Re-derive the block descriptor for the resolve payload. The classifier
/// already ran inside `complete_line`; this only repeats the cheap part.
fn context_block_name(line: &str, cursor: usize) -> Option<(BlockKind, String)> {
    let ctx = crate::completion::context::classify_header_line(line, cursor)?;
    Some((ctx.block.kind, ctx.block.name))
}

fn build_item(
    candidate: &Candidate,
    phase: Phase,
    kind: BlockKind,
    block_name: &str,
    range: Range,
    idx: usize,
) -> CompletionItem {
    let item_kind = match phase {
        Phase::BlockType => CompletionItemKind::MODULE,
        Phase::ParameterKey => CompletionItemKind::PROPERTY,
        Phase::ParameterValue => CompletionItemKind::VALUE,
    };
    // For block-name items the resolve payload names the candidate itself,
    // not the (possibly partial) name on the line.
    let resolve_block = match phase {
        Phase::BlockType => candidate.text.clone(),
        _ => block_name.to_string(),
    };
    let data = ResolveData {
        kind,
        block: resolve_block,
        phase,
        descriptor: candidate.value_type.clone(),
    };

    CompletionItem {
        label: candidate.text.clone(),
        kind: Some(item_kind),
        detail: Some(candidate.annotation.clone()),
        filter_text: Some(candidate.text.clone()),
        sort_text: Some(format!("{:03}", idx)),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: candidate.text.clone(),
        })),
        data: serde_json::to_value(&data).ok(),
        ..CompletionItem::default()
    }
}
