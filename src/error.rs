//! Compilation error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::rep::{RepId, Snapshot};

/// Errors surfaced by representation compilation.
///
/// Missing attributes are never an error (the resolver returns `None`),
/// and unset timestamps are never an error (they conservatively mark a
/// representation outdated). Everything that can actually fail a compile
/// attempt is enumerated here.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A representation's compile path re-entered itself.
    #[error(
        "cyclic dependency while compiling {rep} (stack: {})",
        .stack.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
    )]
    Cyclic { rep: RepId, stack: Vec<RepId> },

    /// A named transformation step failed.
    #[error("filter `{filter}` failed while compiling {rep}")]
    Filter {
        rep: RepId,
        filter: String,
        #[source]
        source: anyhow::Error,
    },

    /// A filter chain or layout named a filter nobody registered.
    #[error("unknown filter `{filter}` while compiling {rep}")]
    UnknownFilter { rep: RepId, filter: String },

    /// The `layout` attribute names a layout the site does not have.
    #[error("unknown layout `{layout}` while compiling {rep}")]
    UnknownLayout { rep: RepId, layout: String },

    /// A lazily requested snapshot is still unset after a compile that
    /// was skipped because the representation is up to date.
    #[error("snapshot `{snapshot}` of {rep} is not available (representation is up to date)")]
    Snapshot { rep: RepId, snapshot: Snapshot },

    /// Writing the compiled output failed at the filesystem boundary.
    #[error("failed to write output of {rep} to `{path}`")]
    Output {
        rep: RepId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep_id() -> RepId {
        RepId {
            item: "/foo/".to_string(),
            rep: "default".to_string(),
        }
    }

    #[test]
    fn test_cyclic_display_includes_chain() {
        let err = CompileError::Cyclic {
            rep: rep_id(),
            stack: vec![
                RepId {
                    item: "/a/".to_string(),
                    rep: "default".to_string(),
                },
                rep_id(),
            ],
        };
        let display = format!("{err}");
        assert!(display.contains("cyclic dependency"));
        assert!(display.contains("/a/"));
        assert!(display.contains("->"));
    }

    #[test]
    fn test_filter_display_names_filter_and_rep() {
        let err = CompileError::Filter {
            rep: rep_id(),
            filter: "template".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        let display = format!("{err}");
        assert!(display.contains("template"));
        assert!(display.contains("/foo/"));
    }

    #[test]
    fn test_snapshot_display() {
        let err = CompileError::Snapshot {
            rep: rep_id(),
            snapshot: Snapshot::Pre,
        };
        assert!(format!("{err}").contains("pre"));
    }
}
