//! Data types used throughout the orgblock LSP server.
//!
//! This module contains the "model" structs and enums shared by the
//! classifier, the candidate resolver and the LSP layer: block descriptors,
//! completion phases, candidates, value-type descriptors and the deferred
//! documentation thunk.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which flavour of block a header line introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// A babel source block: `#+begin_src LANG …`.
    Typed,
    /// A dynamic block: `#+begin: NAME …`.
    Dynamic,
}

/// The block named by the current header line.
///
/// `name` is empty when the user has typed only the opening marker
/// (e.g. `#+begin_src ` with nothing after it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    pub name: String,
}

/// What kind of token is being completed. Determined once per request by the
/// classifier and never changed mid-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Completing the block name itself (a babel language or a dynamic
    /// block writer name).
    BlockType,
    /// Completing a `:key` in the header's parameter region.
    ParameterKey,
    /// Completing the value that follows a known `:key`.
    ParameterValue,
}

/// The result of classifying a header line against the cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderContext {
    pub block: BlockDescriptor,
    pub phase: Phase,
    /// Portion of the block name before the cursor. Only meaningful in the
    /// `BlockType` phase (used as the listing prefix).
    pub name_prefix: String,
    /// The parameter key whose value is being completed, verbatim with its
    /// leading `:`. Only present in the `ParameterValue` phase.
    pub value_key: Option<String>,
}

/// Which extraction tier produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Per-handler structured schema (`org-babel-header-args:<name>`).
    Native,
    /// Mined from the handler's raw elisp definition.
    Source,
    /// Mined from the handler's docstring.
    Doc,
    /// The shared header-arg table applying to all source blocks.
    Common,
    /// A handler name listed for the block-name position.
    BlockType,
}

impl Provenance {
    /// Short lowercase label used in candidate annotations.
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Native => "native",
            Provenance::Source => "source",
            Provenance::Doc => "doc",
            Provenance::Common => "common",
            Provenance::BlockType => "block",
        }
    }
}

/// The declared value type of a header argument.
///
/// Mirrors the shape of babel's header-arg tables: a bare symbolic type, an
/// enumeration of alternatives, or "anything goes". `Any` never expands to
/// literal completion text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDescriptor {
    /// Wildcard: any value is acceptable; contributes no concrete candidates.
    Any,
    /// A single symbolic type or literal value, e.g. `dir` or `yes`.
    Atom(String),
    /// A list of alternatives, each itself a descriptor.
    OneOf(Vec<TypeDescriptor>),
}

/// A deferred documentation computation.
///
/// Building one performs no lookups; only [`LazyDoc::render`] may touch the
/// registry or documentation stores. This keeps producing a candidate list
/// cheap regardless of how many candidates' docs are ever viewed.
#[derive(Clone)]
pub struct LazyDoc(Arc<dyn Fn() -> String + Send + Sync>);

impl LazyDoc {
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        LazyDoc(Arc::new(f))
    }

    /// Run the deferred computation and produce the display document.
    pub fn render(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for LazyDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyDoc(..)")
    }
}

/// One completion suggestion.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The literal text to insert: a handler name, a `:key`, or a value token.
    pub text: String,
    /// The tier that produced this candidate. Never mutated after creation.
    pub provenance: Provenance,
    /// Short human-readable tag shown inline, e.g. `"sql parameter (common)"`.
    pub annotation: String,
    /// Deferred display documentation.
    pub documentation: LazyDoc,
    /// Declared value type; present for parameter-key candidates only.
    pub value_type: Option<TypeDescriptor>,
}

/// The engine-level completion result for one line + cursor.
///
/// `replace_start`/`replace_end` are char offsets into the line bounding the
/// token the candidates would replace.
#[derive(Debug, Clone)]
pub struct LineCompletion {
    pub phase: Phase,
    pub replace_start: usize,
    pub replace_end: usize,
    pub candidates: Vec<Candidate>,
}
