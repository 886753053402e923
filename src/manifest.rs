/// Workspace manifest support.
///
/// A workspace may carry an `org-babel.toml` at its root declaring block
/// handlers the built-in registry doesn't know about — site-local babel
/// languages, dynamic block writers from third-party packages, extra shared
/// header args, and package commentary. The manifest is read once, on
/// `initialized`.
///
/// ```toml
/// [common]
/// ":my-arg" = "any"
///
/// [[handler]]
/// name = "dot"
/// kind = "src"                      # "src" (default) or "dynamic"
/// package = "ob-dot"
/// doc = "Execute graphviz dot blocks."
/// definition-file = "lisp/ob-dot.el"  # or inline: definition = "(defun …)"
///
/// [handler.header-args]
/// ":file" = "any"
/// ":cmdline" = ["dot", "neato", "circo"]
///
/// [package.ob-dot]
/// commentary = "Org-Babel support for graphviz."
/// ```
///
/// Header-arg values are either the string `"any"` (wildcard), any other
/// string (a single symbolic type), or an array of such strings (an
/// enumeration). A missing or malformed manifest leaves the registry as it
/// was; nothing here is an error the user has to deal with mid-keystroke.
use std::path::Path;

use crate::registry::{HandlerInfo, Registry};
use crate::types::{BlockKind, TypeDescriptor};

pub const MANIFEST_NAME: &str = "org-babel.toml";

/// What a manifest load contributed, for the startup log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestStats {
    pub handlers: usize,
    pub common_args: usize,
    pub packages: usize,
}

/// Read `org-babel.toml` from `workspace_root` and fold its declarations
/// into `registry`. Returns `None` when the file is missing or doesn't
/// parse; partial declarations are applied as far as they go.
pub fn apply_manifest(workspace_root: &Path, registry: &mut Registry) -> Option<ManifestStats> {
    let manifest_path = workspace_root.join(MANIFEST_NAME);
    let content = std::fs::read_to_string(&manifest_path).ok()?;
    let value: toml::Value = match content.parse() {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(path = %manifest_path.display(), %err, "ignoring unparsable manifest");
            return None;
        }
    };

    let mut stats = ManifestStats {
        handlers: 0,
        common_args: 0,
        packages: 0,
    };

    if let Some(common) = value.get("common").and_then(|v| v.as_table()) {
        let entries: Vec<(String, TypeDescriptor)> = common
            .iter()
            .filter_map(|(key, v)| parse_descriptor(v).map(|d| (normalize_key(key), d)))
            .collect();
        stats.common_args = entries.len();
        registry.extend_common(entries);
    }

    if let Some(handlers) = value.get("handler").and_then(|v| v.as_array()) {
        for decl in handlers {
            if let Some((kind, name, info)) = parse_handler(workspace_root, decl) {
                registry.register(kind, &name, info);
                stats.handlers += 1;
            }
        }
    }

    if let Some(packages) = value.get("package").and_then(|v| v.as_table()) {
        for (package, entry) in packages {
            if let Some(commentary) = entry.get("commentary").and_then(|v| v.as_str()) {
                registry.set_commentary(package, commentary);
                stats.packages += 1;
            }
        }
    }

    Some(stats)
}

/// One `[[handler]]` table → a registry entry. Declarations without a name
/// are skipped.
fn parse_handler(
    workspace_root: &Path,
    decl: &toml::Value,
) -> Option<(BlockKind, String, HandlerInfo)> {
    let name = decl.get("name")?.as_str()?.to_string();
    let kind = match decl.get("kind").and_then(|v| v.as_str()) {
        Some("dynamic") => BlockKind::Dynamic,
        _ => BlockKind::Typed,
    };

    // Inline definition wins over a definition-file that can't be read.
    let definition = decl
        .get("definition")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| {
            let rel = decl.get("definition-file")?.as_str()?;
            std::fs::read_to_string(workspace_root.join(rel)).ok()
        });

    let header_args = decl
        .get("header-args")
        .and_then(|v| v.as_table())
        .map(|table| {
            table
                .iter()
                .filter_map(|(key, v)| parse_descriptor(v).map(|d| (normalize_key(key), d)))
                .collect()
        })
        .unwrap_or_default();

    let info = HandlerInfo {
        package: decl
            .get("package")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        definition,
        documentation: decl
            .get("doc")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        header_args,
    };
    Some((kind, name, info))
}

/// `"any"` → wildcard, any other string → atom, array → enumeration.
fn parse_descriptor(value: &toml::Value) -> Option<TypeDescriptor> {
    match value {
        toml::Value::String(s) if s == "any" => Some(TypeDescriptor::Any),
        toml::Value::String(s) => Some(TypeDescriptor::Atom(s.clone())),
        toml::Value::Array(items) => {
            let alternatives: Vec<TypeDescriptor> = items
                .iter()
                .filter_map(parse_descriptor)
                .collect();
            if alternatives.is_empty() {
                None
            } else {
                Some(TypeDescriptor::OneOf(alternatives))
            }
        }
        _ => None,
    }
}

/// Header-arg keys always carry their leading `:` internally; the manifest
/// may spell them either way.
fn normalize_key(key: &str) -> String {
    if key.starts_with(':') {
        key.to_string()
    } else {
        format!(":{key}")
    }
}
