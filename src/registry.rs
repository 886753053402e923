//! Handler registry.
//!
//! The registry is the single queryable source of knowledge about block
//! handlers: which babel languages and dynamic block writers exist, their raw
//! elisp definitions and docstrings, their per-handler header-arg schemas,
//! the shared header-arg table for source blocks, and per-package commentary.
//!
//! It is populated at startup from the built-in tables (see `builtins.rs`)
//! and optionally extended from a workspace `org-babel.toml` manifest (see
//! `manifest.rs`). Every lookup is read-only; absence of any piece of data is
//! an ordinary "nothing here" answer, never an error.

use std::collections::{BTreeMap, HashMap};

use crate::types::{BlockKind, TypeDescriptor};

/// Everything the registry knows about one block handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerInfo {
    /// The owning package, e.g. `"ob-sql"`. Used to look up commentary.
    pub package: Option<String>,
    /// Raw elisp source text of the handler function, when known.
    pub definition: Option<String>,
    /// The handler's docstring, when known.
    pub documentation: Option<String>,
    /// Per-handler header-arg schema, in declaration order.
    pub header_args: Vec<(String, TypeDescriptor)>,
}

/// Registry of block handlers, schemas and commentary.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Babel language handlers, keyed by language name (`sql`, `python`, …).
    typed: BTreeMap<String, HandlerInfo>,
    /// Dynamic block writers, keyed by block name (`clocktable`, …).
    dynamic: BTreeMap<String, HandlerInfo>,
    /// Header args shared by every source block, in declaration order.
    common_args: Vec<(String, TypeDescriptor)>,
    /// Package name → descriptive commentary text.
    commentary: HashMap<String, String>,
}

impl Registry {
    /// An empty registry. Useful for tests; production backends start from
    /// [`crate::builtins::builtin_registry`].
    pub fn empty() -> Self {
        Registry::default()
    }

    /// Register (or replace) a handler for the given block kind.
    pub fn register(&mut self, kind: BlockKind, name: &str, info: HandlerInfo) {
        self.table_mut(kind).insert(name.to_string(), info);
    }

    /// Append entries to the shared header-arg table. Later registrations
    /// don't displace earlier keys: first declaration wins.
    pub fn extend_common(&mut self, entries: impl IntoIterator<Item = (String, TypeDescriptor)>) {
        for (key, descriptor) in entries {
            if !self.common_args.iter().any(|(k, _)| *k == key) {
                self.common_args.push((key, descriptor));
            }
        }
    }

    /// Attach commentary text to a package name.
    pub fn set_commentary(&mut self, package: &str, text: &str) {
        self.commentary
            .insert(package.to_string(), text.to_string());
    }

    /// All handler names of the given kind starting with `prefix`, in
    /// lexicographic order.
    pub fn list_handlers(&self, kind: BlockKind, prefix: &str) -> Vec<String> {
        self.table(kind)
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn handler(&self, kind: BlockKind, name: &str) -> Option<&HandlerInfo> {
        self.table(kind).get(name)
    }

    /// Raw source text of the handler's definition, when known.
    pub fn resolve_definition(&self, kind: BlockKind, name: &str) -> Option<&str> {
        self.handler(kind, name)?.definition.as_deref()
    }

    /// The handler's docstring, when known.
    pub fn resolve_documentation(&self, kind: BlockKind, name: &str) -> Option<&str> {
        self.handler(kind, name)?.documentation.as_deref()
    }

    /// Descriptive commentary for a package, when known.
    pub fn commentary(&self, package: &str) -> Option<&str> {
        self.commentary.get(package).map(String::as_str)
    }

    /// The per-handler header-arg schema. Missing handler or missing schema
    /// both yield an empty slice.
    pub fn native_schema(&self, kind: BlockKind, name: &str) -> &[(String, TypeDescriptor)] {
        self.handler(kind, name)
            .map(|info| info.header_args.as_slice())
            .unwrap_or(&[])
    }

    /// The shared header-arg table applying to all source blocks.
    pub fn common_schema(&self) -> &[(String, TypeDescriptor)] {
        &self.common_args
    }

    /// The conventional elisp function name behind a block handler.
    pub fn handler_function(kind: BlockKind, name: &str) -> String {
        match kind {
            BlockKind::Typed => format!("org-babel-execute:{name}"),
            BlockKind::Dynamic => format!("org-dblock-write:{name}"),
        }
    }

    /// The conventional name of a handler's header-arg schema table.
    pub fn schema_table_name(name: &str) -> String {
        format!("org-babel-header-args:{name}")
    }

    fn table(&self, kind: BlockKind) -> &BTreeMap<String, HandlerInfo> {
        match kind {
            BlockKind::Typed => &self.typed,
            BlockKind::Dynamic => &self.dynamic,
        }
    }

    fn table_mut(&mut self, kind: BlockKind) -> &mut BTreeMap<String, HandlerInfo> {
        match kind {
            BlockKind::Typed => &mut self.typed,
            BlockKind::Dynamic => &mut self.dynamic,
        }
    }
}
