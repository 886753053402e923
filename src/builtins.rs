//! Built-in registry content.
//!
//! A useful out-of-the-box registry: the shared babel header-arg table, a
//! handful of widely used babel languages with their elisp definitions,
//! docstrings and per-language schemas, and the two stock dynamic block
//! writers. The elisp snippets are embedded verbatim so the source-heuristic
//! extractor has real definitions to mine, exactly as it would against a live
//! Emacs. Workspace manifests can extend or shadow all of this (see
//! `manifest.rs`).

use crate::registry::{HandlerInfo, Registry};
use crate::types::BlockKind;
use crate::types::TypeDescriptor::{Any, Atom, OneOf};

const OB_SQL_EXECUTE: &str = r#"(defun org-babel-execute:sql (body params)
  "Execute a block of Sql code with Babel.
This function is called by `org-babel-execute-src-block'."
  (let* ((result-params (cdr (assq :result-params params)))
         (cmdline (cdr (assq :cmdline params)))
         (dbhost (cdr (assq :dbhost params)))
         (dbport (cdr (assq :dbport params)))
         (dbuser (cdr (assq :dbuser params)))
         (dbpassword (cdr (assq :dbpassword params)))
         (database (cdr (assq :database params)))
         (engine (cdr (assq :engine params)))
         (colnames-p (not (equal "no" (cdr (assq :colnames params)))))
         (in-file (org-babel-temp-file "sql-in-"))
         (out-file (or (cdr (assq :out-file params))
                       (org-babel-temp-file "sql-out-"))))
    (with-temp-file in-file
      (insert (org-babel-expand-body:sql body params)))
    (org-babel-eval (org-babel-sql-command engine in-file out-file) "")
    (org-babel-result-cond result-params
      (with-temp-buffer (insert-file-contents out-file) (buffer-string))
      (org-table-import out-file '(16)))))"#;

const OB_SHELL_EXECUTE: &str = r#"(defun org-babel-execute:shell (body params)
  "Execute a block of Shell commands with Babel.
This function is called by `org-babel-execute-src-block'."
  (let* ((session (org-babel-sh-initiate-session
                   (cdr (assq :session params))))
         (stdin (let ((stdin (cdr (assq :stdin params))))
                  (when stdin (org-babel-sh-var-to-string
                               (org-babel-ref-resolve stdin)))))
         (results-params (cdr (assq :result-params params)))
         (value-is-exit-status
          (or (null results-params)
              (member "value" results-params)))
         (cmdline (cdr (assq :cmdline params)))
         (shebang (cdr (assq :shebang params)))
         (padline (not (equal "no" (cdr (assq :padline params)))))
         (full-body (concat
                     (org-babel-expand-body:generic
                      body params (org-babel-variable-assignments:shell params)))))
    (org-babel-reassemble-table
     (org-babel-sh-evaluate session full-body params stdin cmdline)
     (org-babel-pick-name
      (cdr (assq :colname-names params)) (cdr (assq :colnames params)))
     (org-babel-pick-name
      (cdr (assq :rowname-names params)) (cdr (assq :rownames params))))))"#;

const OB_GNUPLOT_EXECUTE: &str = r#"(defun org-babel-execute:gnuplot (body params)
  "Execute a block of Gnuplot code with Babel."
  (let* ((result-params (cdr (assq :result-params params)))
         (out-file (cdr (assq :file params)))
         (term (or (cdr (assq :term params))
                   (and out-file (file-name-extension out-file))))
         (missing (cdr (assq :missing params)))
         (sets (cdr (assq :set params)))
         (x-labels (cdr (assq :xlabels params)))
         (timefmt (cdr (assq :timefmt params)))
         (prologue (cdr (assq :prologue params)))
         (epilogue (cdr (assq :epilogue params)))
         (script-file (org-babel-temp-file "gnuplot-script-")))
    (org-babel-gnuplot-initiate-session
     (cdr (assq :session params)) params)
    (with-temp-file script-file
      (insert (org-babel-expand-body:gnuplot body params)))
    (message "gnuplot \"%s\"" script-file)
    out-file))"#;

const CLOCKTABLE_WRITE: &str = r#"(defun org-dblock-write:clocktable (params)
  "Write the standard clocktable."
  (setq params (org-combine-plists org-clocktable-defaults params))
  (catch 'exit
    (let* ((scope (plist-get params :scope))
           (base-buffer (org-base-buffer (current-buffer)))
           (files (pcase scope
                    (`agenda (org-agenda-files t))
                    (`agenda-with-archives
                     (org-add-archive-files (org-agenda-files t)))
                    ((pred functionp) (funcall scope))
                    (_ (or (buffer-file-name base-buffer)
                           (current-buffer)))))
           (block (plist-get params :block))
           (ts (plist-get params :tstart))
           (te (plist-get params :tend))
           (maxlevel (or (plist-get params :maxlevel) 2))
           (step (plist-get params :step))
           (formatter (or (plist-get params :formatter)
                          org-clock-clocktable-formatter
                          'org-clocktable-write-default)))
      (when block
        (setq cc (org-clock-special-range block nil t
                                          (plist-get params :wstart)
                                          (plist-get params :mstart))))
      (funcall formatter origin tables params))))"#;

const COLUMNVIEW_WRITE: &str = r#"(defun org-dblock-write:columnview (params)
  "Write the column view table.
PARAMS is a property list of parameters:
`:id' (mandatory) specifies the position of the column view."
  (let ((table
         (let ((id (plist-get params :id))
               (link (plist-get params :link))
               (hlines (plist-get params :hlines))
               (indent (plist-get params :indent))
               (vlines (plist-get params :vlines))
               (skip-empty-rows (plist-get params :skip-empty-rows))
               (exclude-tags (plist-get params :exclude-tags))
               view-pos)
           (org-columns--capture-view
            (plist-get params :maxlevel)
            skip-empty-rows exclude-tags hlines indent view-pos))))
    (when table
      (insert (org-columns--clean-item (mapconcat #'identity table "\n"))))))"#;

/// The default registry: common babel header args, core languages, and the
/// stock dynamic block writers.
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::empty();

    registry.extend_common(common_header_args());

    registry.register(
        BlockKind::Typed,
        "sql",
        HandlerInfo {
            package: Some("ob-sql".into()),
            definition: Some(OB_SQL_EXECUTE.into()),
            documentation: Some(
                "Execute a block of Sql code with Babel.\n\
                 Use ‘:engine’ to pick the client, ‘:cmdline’ for extra \
                 switches, and ‘:database’ to name the schema to connect to."
                    .into(),
            ),
            header_args: vec![
                (
                    ":engine".into(),
                    OneOf(vec![
                        Atom("mysql".into()),
                        Atom("postgresql".into()),
                        Atom("sqsh".into()),
                        Atom("sqlite".into()),
                        Atom("mssql".into()),
                        Atom("oracle".into()),
                        Atom("vertica".into()),
                        Atom("saphana".into()),
                    ]),
                ),
                (":cmdline".into(), Any),
                (":dbhost".into(), Any),
                (":dbport".into(), Any),
                (":dbuser".into(), Any),
                (":dbpassword".into(), Any),
                (":database".into(), Any),
            ],
        },
    );

    registry.register(
        BlockKind::Typed,
        "python",
        HandlerInfo {
            package: Some("ob-python".into()),
            definition: None,
            documentation: Some(
                "Execute a block of Python code with Babel.\n\
                 Sessions are supported; see ‘:session’ and ‘:python’."
                    .into(),
            ),
            header_args: vec![
                (":return".into(), Any),
                (":python".into(), Any),
                (
                    ":results".into(),
                    OneOf(vec![Atom("output".into()), Atom("value".into())]),
                ),
            ],
        },
    );

    // No schema on purpose: shell header args are discovered by mining the
    // executor's definition.
    registry.register(
        BlockKind::Typed,
        "shell",
        HandlerInfo {
            package: Some("ob-shell".into()),
            definition: Some(OB_SHELL_EXECUTE.into()),
            documentation: Some("Execute a block of Shell commands with Babel.".into()),
            header_args: vec![],
        },
    );

    registry.register(
        BlockKind::Typed,
        "gnuplot",
        HandlerInfo {
            package: Some("ob-gnuplot".into()),
            definition: Some(OB_GNUPLOT_EXECUTE.into()),
            documentation: Some("Execute a block of Gnuplot code with Babel.".into()),
            header_args: vec![],
        },
    );

    // Docstring only: header args surface through the doc-heuristic tier.
    registry.register(
        BlockKind::Typed,
        "emacs-lisp",
        HandlerInfo {
            package: Some("ob-emacs-lisp".into()),
            definition: None,
            documentation: Some(
                "Execute Emacs Lisp with Babel.\n\
                 Set ‘:lexical’ to control the binding discipline of the \
                 evaluated form. ‘:wrap’ and ‘:unwind’ govern cleanup."
                    .into(),
            ),
            header_args: vec![],
        },
    );

    registry.register(
        BlockKind::Dynamic,
        "clocktable",
        HandlerInfo {
            package: Some("org-clock".into()),
            definition: Some(CLOCKTABLE_WRITE.into()),
            documentation: Some("Write the standard clocktable.".into()),
            header_args: vec![],
        },
    );

    registry.register(
        BlockKind::Dynamic,
        "columnview",
        HandlerInfo {
            package: Some("org-colview".into()),
            definition: Some(COLUMNVIEW_WRITE.into()),
            documentation: Some("Write the column view table.".into()),
            header_args: vec![],
        },
    );

    registry.set_commentary(
        "ob-sql",
        "Org-Babel support for evaluating sql source code.\n\
         SQL is somewhat unique in that there are many different engines for\n\
         the evaluation of sql (Mysql, PostgreSQL, sqsh, ...), so much of this\n\
         file generates engine-specific command lines.",
    );
    registry.set_commentary(
        "ob-shell",
        "Org-Babel support for evaluating shell source code.",
    );
    registry.set_commentary(
        "org-clock",
        "This file contains the time clocking code for Org mode.",
    );

    registry
}

/// The shared header-arg table: keys valid on every source block, with the
/// value alternatives babel advertises for them.
fn common_header_args() -> Vec<(String, crate::types::TypeDescriptor)> {
    vec![
        (":cache".into(), OneOf(vec![Atom("no".into()), Atom("yes".into())])),
        (":cmdline".into(), Any),
        (
            ":colnames".into(),
            OneOf(vec![Atom("no".into()), Atom("yes".into())]),
        ),
        (
            ":comments".into(),
            OneOf(vec![
                Atom("no".into()),
                Atom("link".into()),
                Atom("yes".into()),
                Atom("org".into()),
                Atom("both".into()),
                Atom("noweb".into()),
            ]),
        ),
        (":dir".into(), Any),
        (
            ":eval".into(),
            OneOf(vec![
                Atom("never".into()),
                Atom("query".into()),
                Atom("never-export".into()),
                Atom("query-export".into()),
            ]),
        ),
        (
            ":exports".into(),
            OneOf(vec![
                Atom("code".into()),
                Atom("results".into()),
                Atom("both".into()),
                Atom("none".into()),
            ]),
        ),
        (":file".into(), Any),
        (":file-desc".into(), Any),
        (
            ":noweb".into(),
            OneOf(vec![
                Atom("yes".into()),
                Atom("no".into()),
                Atom("tangle".into()),
                Atom("no-export".into()),
                Atom("strip-export".into()),
                Atom("eval".into()),
            ]),
        ),
        (":noweb-ref".into(), Any),
        (":noweb-sep".into(), Any),
        (
            ":results".into(),
            OneOf(vec![
                // collection
                Atom("output".into()),
                Atom("value".into()),
                // type
                Atom("file".into()),
                Atom("list".into()),
                Atom("vector".into()),
                Atom("table".into()),
                Atom("scalar".into()),
                Atom("verbatim".into()),
                // format
                Atom("raw".into()),
                Atom("html".into()),
                Atom("latex".into()),
                Atom("org".into()),
                Atom("code".into()),
                Atom("pp".into()),
                Atom("drawer".into()),
                // handling
                Atom("replace".into()),
                Atom("silent".into()),
                Atom("none".into()),
                Atom("append".into()),
                Atom("prepend".into()),
            ]),
        ),
        (":session".into(), Any),
        (
            ":tangle".into(),
            // A filename is also accepted, hence the wildcard alternative.
            OneOf(vec![Atom("tangle".into()), Atom("yes".into()), Atom("no".into()), Any]),
        ),
        (":var".into(), Any),
        (":wrap".into(), Any),
    ]
}
