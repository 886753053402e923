//! orgblock LSP — context-aware completion for Org block header lines.
//!
//! The engine classifies the cursor position on a header line
//! (`#+begin_src sql :results output`) into one of three phases — block
//! name, parameter key, parameter value — and resolves candidates through a
//! waterfall of knowledge tiers: per-handler schemas, the handler's raw
//! elisp definition, its docstring, and the shared header-arg table. Each
//! candidate carries its provenance and a deferred documentation thunk that
//! only runs when the client resolves the item.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tower_lsp::Client;

pub mod builtins;
pub mod completion;
pub mod manifest;
pub mod registry;
pub mod types;
pub mod util;

mod server;

pub use registry::{HandlerInfo, Registry};
pub use types::{
    BlockDescriptor, BlockKind, Candidate, HeaderContext, LazyDoc, LineCompletion, Phase,
    Provenance, TypeDescriptor,
};

pub struct Backend {
    name: String,
    version: String,
    /// URI → current full text of every open document.
    pub(crate) open_files: Arc<Mutex<HashMap<String, String>>>,
    pub(crate) workspace_root: Arc<Mutex<Option<PathBuf>>>,
    /// All block-handler knowledge. Shared with documentation thunks, which
    /// read it only when rendered.
    pub(crate) registry: Arc<Mutex<Registry>>,
    client: Option<Client>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            name: "orgblock-lsp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_files: Arc::new(Mutex::new(HashMap::new())),
            workspace_root: Arc::new(Mutex::new(None)),
            registry: Arc::new(Mutex::new(builtins::builtin_registry())),
            client: Some(client),
        }
    }

    /// Backend without a client, for tests: built-in registry, no workspace.
    pub fn new_test() -> Self {
        Self {
            name: "orgblock-lsp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_files: Arc::new(Mutex::new(HashMap::new())),
            workspace_root: Arc::new(Mutex::new(None)),
            registry: Arc::new(Mutex::new(builtins::builtin_registry())),
            client: None,
        }
    }

    /// Backend over a caller-assembled registry, for tests that pin exactly
    /// which knowledge tiers exist.
    pub fn new_test_with_registry(registry: Registry) -> Self {
        let backend = Self::new_test();
        if let Ok(mut current) = backend.registry.lock() {
            *current = registry;
        }
        backend
    }

    /// Backend with a workspace root, for tests exercising manifest loading.
    pub fn new_test_with_workspace(root: PathBuf) -> Self {
        let backend = Self::new_test();
        if let Ok(mut workspace) = backend.workspace_root.lock() {
            *workspace = Some(root);
        }
        backend
    }

    /// Shared handle to the registry. Tests use this to mutate knowledge
    /// between candidate creation and documentation rendering.
    pub fn registry_handle(&self) -> Arc<Mutex<Registry>> {
        Arc::clone(&self.registry)
    }

    /// Fold the workspace `org-babel.toml` (if any) into the registry.
    /// Called from `initialized`; exposed for tests.
    pub fn load_workspace_manifest(&self) -> Option<manifest::ManifestStats> {
        let root = self.workspace_root.lock().ok()?.clone()?;
        let mut registry = self.registry.lock().ok()?;
        manifest::apply_manifest(&root, &mut registry)
    }
}
