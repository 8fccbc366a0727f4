//! Compilation orchestration.
//!
//! The compiler walks representations through the transformation
//! pipeline:
//!
//! ```text
//! raw content ──► pre-filters ──► layout ──► post-filters ──► output
//!                     │                          │
//!                     ▼                          ▼
//!                `pre` snapshot             `post` snapshot
//! ```
//!
//! Compilation is lazy and re-entrant: a filter may read another
//! representation's content, which triggers a nested compile. The
//! explicit compilation stack detects cycles in that chain and a drop
//! guard keeps the stack balanced on every exit path, so a failed nested
//! compile never leaves entries behind that would falsely trip cycle
//! detection later.

pub mod rep;

use parking_lot::Mutex;
use toml::Value;

use crate::data::attributes::string_list;
use crate::data::{Item, Layout};
use crate::error::CompileError;
use crate::filters::FilterContext;
use crate::log;
use crate::site::Site;

pub use rep::{ItemRep, RepId, Snapshot};

// ============================================================================
// Outcomes
// ============================================================================

/// Result record of one compile attempt.
///
/// Mirrors the representation's flags so callers get a consistent view
/// of the attempt without re-reading shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    /// The pipeline ran to completion.
    pub compiled: bool,
    /// Output was produced where no file existed before.
    pub created: bool,
    /// Output content changed compared to the previous file.
    pub modified: bool,
    /// The attempt was skipped because the representation is up to date.
    pub skipped: bool,
}

impl CompileOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Aggregated result of a whole-site compilation pass.
///
/// Partial-failure semantics live with the caller: the pass records
/// failures and keeps compiling the remaining representations.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub outcomes: Vec<(RepId, CompileOutcome)>,
    pub failures: Vec<(RepId, CompileError)>,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn compiled_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.compiled).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.skipped).count()
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Orchestrates compilation across all representations of a site.
///
/// One instance per compilation run. The stack holds the active
/// compilation chain and is the sole shared mutable resource of the
/// core; it is expected to be empty whenever no compile is in flight.
#[derive(Debug, Default)]
pub struct Compiler {
    stack: Mutex<Vec<RepId>>,
}

/// Pops the owning compiler's stack when dropped, covering early returns
/// and error paths alike.
struct StackGuard<'a> {
    stack: &'a Mutex<Vec<RepId>>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.lock().pop();
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the active compilation chain.
    pub fn stack_depth(&self) -> usize {
        self.stack.lock().len()
    }

    /// Push `id` onto the stack, rejecting re-entrant compilation.
    fn enter(&self, id: &RepId) -> Result<StackGuard<'_>, CompileError> {
        let mut stack = self.stack.lock();
        if stack.contains(id) {
            return Err(CompileError::Cyclic {
                rep: id.clone(),
                stack: stack.clone(),
            });
        }
        stack.push(id.clone());
        Ok(StackGuard { stack: &self.stack })
    }

    /// Compile a single representation.
    ///
    /// With `force` false this is compile-if-needed: an up-to-date
    /// representation is skipped and its flags stay reset. With `force`
    /// true the staleness check is bypassed (the whole-site pass).
    ///
    /// Failures leave the snapshot cache as it was before the failing
    /// stage: partial results are discarded, not stored.
    pub fn compile_rep(
        &self,
        site: &Site,
        item: &Item,
        rep: &ItemRep,
        force: bool,
    ) -> Result<CompileOutcome, CompileError> {
        let _guard = self.enter(&rep.id())?;

        rep.reset_flags();
        if !force && !rep.outdated(site, item) {
            return Ok(CompileOutcome::skipped());
        }

        // Stage 1: pre-filters. Skipped when `pre` is already cached so
        // a mid-pipeline lazy read never redoes completed work.
        let pre = match rep.snapshot(Snapshot::Pre) {
            Some(cached) => cached,
            None => {
                let mut content = item.content().to_string();
                for filter in filter_chain(site, item, rep, "filters_pre") {
                    let ctx = FilterContext::new(site, item, rep);
                    content = site.filters().run(&filter, &content, &ctx)?;
                }
                rep.set_snapshot(Snapshot::Pre, content.clone());
                content
            }
        };

        // Stage 2: layout, binding the pre-rendered content into the
        // layout's context.
        let layouted = match resolve_layout(site, item, rep)? {
            Some(layout) => {
                let ctx = FilterContext::new(site, item, rep).with_var("content", pre);
                site.filters().run(layout.processor(), layout.content(), &ctx)?
            }
            None => pre,
        };

        // Stage 3: post-filters.
        let mut post = layouted;
        for filter in filter_chain(site, item, rep, "filters_post") {
            let ctx = FilterContext::new(site, item, rep);
            post = site.filters().run(&filter, &post, &ctx)?;
        }
        rep.set_snapshot(Snapshot::Post, post.clone());

        // Stage 4: output bookkeeping. The output file is the only
        // persisted state; writing only on change keeps its mtime stable
        // for the staleness checks anchored on it.
        let skip_output = rep
            .attribute(item, site.defaults(), "skip_output")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let (created, modified) = if skip_output {
            (false, false)
        } else {
            let path = rep.disk_path(site, item);
            let created = !site.vfs().exists(&path);
            let modified =
                created || site.vfs().read(&path).map(|prev| prev != post).unwrap_or(true);
            if created || modified {
                site.vfs()
                    .write(&path, &post)
                    .map_err(|source| CompileError::Output {
                        rep: rep.id(),
                        path: path.clone(),
                        source,
                    })?;
            }
            (created, modified)
        };

        rep.finish(created, modified);
        Ok(CompileOutcome {
            compiled: true,
            created,
            modified,
            skipped: false,
        })
    }

    /// Compile every representation of every item.
    ///
    /// Clears the stack, walks all representations, logs outcomes, and
    /// collects failures instead of aborting the pass.
    pub fn compile_site(&self, site: &Site, force: bool) -> CompileReport {
        self.stack.lock().clear();

        let mut report = CompileReport::default();
        for item in site.items() {
            for rep in item.reps() {
                let id = rep.id();
                match self.compile_rep(site, item, rep, force) {
                    Ok(outcome) => {
                        if outcome.compiled {
                            log!("compile"; "{id}");
                        }
                        report.outcomes.push((id, outcome));
                    }
                    Err(err) => {
                        log!("error"; "{err}");
                        report.failures.push((id, err));
                    }
                }
            }
        }
        report
    }
}

/// Resolve the representation's filter chain attribute into filter names.
fn filter_chain(site: &Site, item: &Item, rep: &ItemRep, attribute: &str) -> Vec<String> {
    string_list(rep.attribute(item, site.defaults(), attribute))
}

/// Resolve the `layout` attribute to a layout, if one applies.
///
/// `"none"` (or a non-string value) means no layout. The built-in
/// fallback name `default` refers to an optional site-default layout:
/// when no layout by that name exists the stage passes content through.
/// Any other missing layout is a configuration error.
fn resolve_layout<'s>(
    site: &'s Site,
    item: &Item,
    rep: &ItemRep,
) -> Result<Option<&'s Layout>, CompileError> {
    let Some(value) = rep.attribute(item, site.defaults(), "layout") else {
        return Ok(None);
    };
    let Some(name) = value.as_str() else {
        return Ok(None);
    };
    if name == "none" {
        return Ok(None);
    }

    let identifier = if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}/")
    };
    match site.layout(&identifier) {
        Some(layout) => Ok(Some(layout)),
        None if name == "default" => Ok(None),
        None => Err(CompileError::UnknownLayout {
            rep: rep.id(),
            layout: name.to_string(),
        }),
    }
}
