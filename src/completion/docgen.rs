//! Deferred documentation synthesis.
//!
//! Candidates carry a [`LazyDoc`] instead of a rendered string: assembling a
//! display document reads the registry (commentary, docstrings), and none of
//! that work should happen while the candidate list is being produced. The
//! thunks built here capture the registry handle and only touch it when
//! rendered — in the LSP layer that is `completionItem/resolve`, never
//! `textDocument/completion`.
//!
//! A rendered document composes, in order, separated by a rule:
//!
//! 1. a human-readable rendering of the value type (when known)
//! 2. the owning package's commentary
//! 3. a header naming the underlying handler function
//! 4. the handler's raw docstring
//!
//! Every piece is optional; whatever is missing is simply left out.

use std::sync::{Arc, Mutex};

use crate::registry::Registry;
use crate::types::{BlockKind, LazyDoc, TypeDescriptor};

const RULE: &str = "\n\n---\n\n";

/// Deferred documentation for a parameter key or value candidate.
pub(crate) fn parameter_doc(
    registry: Arc<Mutex<Registry>>,
    kind: BlockKind,
    block_name: String,
    descriptor: Option<TypeDescriptor>,
) -> LazyDoc {
    LazyDoc::new(move || {
        let mut sections: Vec<String> = Vec::new();
        if let Some(ref descriptor) = descriptor {
            sections.push(describe_type(descriptor));
        }
        append_handler_sections(&registry, kind, &block_name, &mut sections);
        sections.join(RULE)
    })
}

/// Deferred documentation for a block-name candidate.
pub(crate) fn handler_doc(
    registry: Arc<Mutex<Registry>>,
    kind: BlockKind,
    block_name: String,
) -> LazyDoc {
    LazyDoc::new(move || {
        let mut sections: Vec<String> = Vec::new();
        append_handler_sections(&registry, kind, &block_name, &mut sections);
        sections.join(RULE)
    })
}

/// Commentary, handler-function header and docstring for a block, in order.
fn append_handler_sections(
    registry: &Arc<Mutex<Registry>>,
    kind: BlockKind,
    block_name: &str,
    sections: &mut Vec<String>,
) {
    let Ok(registry) = registry.lock() else {
        return;
    };
    if let Some(info) = registry.handler(kind, block_name) {
        if let Some(commentary) = info.package.as_deref().and_then(|p| registry.commentary(p)) {
            sections.push(commentary.to_string());
        }
        sections.push(format!(
            "Function: {}",
            Registry::handler_function(kind, block_name)
        ));
        if let Some(doc) = info.documentation.as_deref() {
            sections.push(doc.to_string());
        }
    }
}

/// Human-readable rendering of a value type.
pub(crate) fn describe_type(descriptor: &TypeDescriptor) -> String {
    match descriptor {
        TypeDescriptor::Any => "Accepts any value.".to_string(),
        TypeDescriptor::Atom(name) => format!("Type: {name}"),
        TypeDescriptor::OneOf(alternatives) => {
            let names: Vec<String> = alternatives
                .iter()
                .map(|alt| match alt {
                    TypeDescriptor::Any => "any".to_string(),
                    other => describe_type_bare(other),
                })
                .collect();
            format!("One of: {}", names.join(", "))
        }
    }
}

fn describe_type_bare(descriptor: &TypeDescriptor) -> String {
    match descriptor {
        TypeDescriptor::Any => "any".to_string(),
        TypeDescriptor::Atom(name) => name.clone(),
        TypeDescriptor::OneOf(alternatives) => alternatives
            .iter()
            .map(describe_type_bare)
            .collect::<Vec<_>>()
            .join(" | "),
    }
}
