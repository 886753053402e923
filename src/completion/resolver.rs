//! Candidate aggregation.
//!
//! This module owns the fallback policy between the extraction tiers and the
//! engine-level entry point [`Backend::complete_line`].
//!
//! Key resolution runs a waterfall: the per-handler schema first, then the
//! source-heuristic scan, then the docstring scan — stopping at the first
//! tier that yields anything. The common header-arg table is *not* a
//! fallback tier: common keys are always valid on a source block, so for
//! `Typed` blocks they are appended regardless of what the earlier tiers
//! found. Value resolution only answers for schema-known keys; keys that
//! were discovered heuristically have no declared type to expand.

use crate::Backend;
use crate::completion::{context, doc_scan, docgen, schema, source_scan};
use crate::types::{
    BlockDescriptor, BlockKind, Candidate, LineCompletion, Phase, Provenance, TypeDescriptor,
};
use crate::util;

impl Backend {
    /// Completion for one line of text and a cursor char-offset within it:
    /// classify the position, resolve candidates for its phase, and bound the
    /// token to replace. `None` when the line is not a block header — never
    /// an error.
    pub fn complete_line(&self, line: &str, cursor: usize) -> Option<LineCompletion> {
        let ctx = context::classify_header_line(line, cursor)?;

        let candidates = match ctx.phase {
            Phase::BlockType => {
                self.resolve_block_type_candidates(ctx.block.kind, &ctx.name_prefix)
            }
            Phase::ParameterKey => self.resolve_parameter_candidates(&ctx.block),
            Phase::ParameterValue => {
                let key = ctx.value_key.as_deref().unwrap_or_default();
                self.resolve_value_candidates(&ctx.block, key)
            }
        };

        let (replace_start, replace_end) = util::token_bounds_at(line, cursor);
        Some(LineCompletion {
            phase: ctx.phase,
            replace_start,
            replace_end,
            candidates,
        })
    }

    /// Handler names of `kind` starting with `prefix`.
    pub(crate) fn resolve_block_type_candidates(
        &self,
        kind: BlockKind,
        prefix: &str,
    ) -> Vec<Candidate> {
        let Ok(registry) = self.registry.lock() else {
            return Vec::new();
        };
        let annotation = match kind {
            BlockKind::Typed => "babel language",
            BlockKind::Dynamic => "dynamic block",
        };
        registry
            .list_handlers(kind, prefix)
            .into_iter()
            .map(|name| Candidate {
                documentation: docgen::handler_doc(self.registry.clone(), kind, name.clone()),
                text: name,
                provenance: Provenance::BlockType,
                annotation: annotation.to_string(),
                value_type: None,
            })
            .collect()
    }

    /// Header-arg keys for a block, per the tier waterfall.
    pub(crate) fn resolve_parameter_candidates(&self, block: &BlockDescriptor) -> Vec<Candidate> {
        let Ok(registry) = self.registry.lock() else {
            return Vec::new();
        };
        let kind = block.kind;
        let name = block.name.as_str();

        let mut out = schema::candidates(
            &self.registry,
            kind,
            name,
            registry.native_schema(kind, name),
            Provenance::Native,
        );

        if out.is_empty()
            && let Some(definition) = registry.resolve_definition(kind, name)
        {
            out = self.heuristic_candidates(
                block,
                source_scan::extract_parameter_keys(definition, kind),
                Provenance::Source,
            );
        }

        if out.is_empty()
            && let Some(doc) = registry.resolve_documentation(kind, name)
        {
            out = self.heuristic_candidates(
                block,
                doc_scan::extract_parameter_keys(doc),
                Provenance::Doc,
            );
        }

        // Common args are additive for source blocks, not a fallback tier.
        if kind == BlockKind::Typed {
            out.extend(schema::candidates(
                &self.registry,
                kind,
                name,
                registry.common_schema(),
                Provenance::Common,
            ));
        }

        dedup_by_text(out)
    }

    /// Value suggestions for one key, from whichever schema knows it.
    pub(crate) fn resolve_value_candidates(
        &self,
        block: &BlockDescriptor,
        key: &str,
    ) -> Vec<Candidate> {
        let Ok(registry) = self.registry.lock() else {
            return Vec::new();
        };
        let kind = block.kind;
        let name = block.name.as_str();

        let native = schema_lookup(registry.native_schema(kind, name), key)
            .map(|descriptor| (descriptor, Provenance::Native));
        let found = native.or_else(|| {
            if kind == BlockKind::Typed {
                schema_lookup(registry.common_schema(), key)
                    .map(|descriptor| (descriptor, Provenance::Common))
            } else {
                None
            }
        });
        // Heuristically-discovered keys carry no descriptor: nothing to offer.
        let Some((descriptor, provenance)) = found else {
            return Vec::new();
        };

        schema::expand(descriptor)
            .into_iter()
            .map(|value| Candidate {
                text: value,
                provenance,
                annotation: format!("{} value ({})", key, provenance.label()),
                documentation: docgen::parameter_doc(
                    self.registry.clone(),
                    kind,
                    name.to_string(),
                    Some(descriptor.clone()),
                ),
                value_type: None,
            })
            .collect()
    }

    fn heuristic_candidates(
        &self,
        block: &BlockDescriptor,
        keys: Vec<String>,
        provenance: Provenance,
    ) -> Vec<Candidate> {
        keys.into_iter()
            .map(|key| Candidate {
                text: key,
                provenance,
                annotation: format!("{} parameter ({})", block.name, provenance.label()),
                documentation: docgen::parameter_doc(
                    self.registry.clone(),
                    block.kind,
                    block.name.clone(),
                    None,
                ),
                value_type: None,
            })
            .collect()
    }
}

fn schema_lookup<'a>(
    entries: &'a [(String, TypeDescriptor)],
    key: &str,
) -> Option<&'a TypeDescriptor> {
    entries
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, descriptor)| descriptor)
}

/// Deduplicate by insertion text; the first occurrence (= the earlier tier)
/// keeps its provenance and annotation.
fn dedup_by_text(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.contains(&candidate.text) {
            seen.push(candidate.text.clone());
            out.push(candidate);
        }
    }
    out
}
