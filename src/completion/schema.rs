//! Schema-backed candidates and value-type expansion.
//!
//! The "native" and "common" tiers are pure transforms of an already
//! structured key → type-descriptor table; all the judgement lives in the
//! descriptors themselves. The expander turns a descriptor into the concrete
//! value strings worth suggesting — wildcards contribute nothing, since no
//! literal text represents "any value".

use std::sync::{Arc, Mutex};

use crate::completion::docgen;
use crate::registry::Registry;
use crate::types::{BlockKind, Candidate, Provenance, TypeDescriptor};

/// One candidate per schema entry, in table order.
///
/// `provenance` must be `Native` or `Common`; the annotation carries its
/// label so the popup shows where a key came from.
pub(crate) fn candidates(
    registry: &Arc<Mutex<Registry>>,
    kind: BlockKind,
    block_name: &str,
    entries: &[(String, TypeDescriptor)],
    provenance: Provenance,
) -> Vec<Candidate> {
    entries
        .iter()
        .map(|(key, descriptor)| Candidate {
            text: key.clone(),
            provenance,
            annotation: format!("{} parameter ({})", block_name, provenance.label()),
            documentation: docgen::parameter_doc(
                Arc::clone(registry),
                kind,
                block_name.to_string(),
                Some(descriptor.clone()),
            ),
            value_type: Some(descriptor.clone()),
        })
        .collect()
}

/// Expand a descriptor into concrete completion strings.
///
/// Atoms yield their textual name, enumerations flatten recursively with
/// duplicates removed, and the wildcard yields nothing at all.
pub fn expand(descriptor: &TypeDescriptor) -> Vec<String> {
    match descriptor {
        TypeDescriptor::Any => Vec::new(),
        TypeDescriptor::Atom(name) => vec![name.clone()],
        TypeDescriptor::OneOf(alternatives) => {
            let mut values = Vec::new();
            for alt in alternatives {
                for value in expand(alt) {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
            }
            values
        }
    }
}
