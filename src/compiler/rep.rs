//! Item representations: the unit of compilation.
//!
//! A representation is one named, independently compiled variant of an
//! item's output. It caches its rendered content per snapshot (`pre` =
//! after the pre-filter chain, `post` = final) and tracks the outcome of
//! the most recent compile attempt through three transient flags.

use std::fmt;
use std::path::PathBuf;

use parking_lot::RwLock;
use toml::Value;

use crate::data::attributes::{self, AttributeMap};
use crate::data::{Defaults, Item};
use crate::error::CompileError;
use crate::site::Site;

// ============================================================================
// Identity
// ============================================================================

/// Identity of a representation: owning item identifier plus rep name.
///
/// Used for cycle detection on the compilation stack and for tagging
/// errors with the representation they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepId {
    pub item: String,
    pub rep: String,
}

impl fmt::Display for RepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rep: {})", self.item, self.rep)
    }
}

/// A named stage of a representation's rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Snapshot {
    /// After the pre-filter chain, before any layout.
    Pre,
    /// Final content, after layout and post-filters.
    Post,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Pre => write!(f, "pre"),
            Snapshot::Post => write!(f, "post"),
        }
    }
}

// ============================================================================
// Representation
// ============================================================================

/// Mutable compile-time state, kept behind one lock so a reader never
/// observes a half-updated combination.
#[derive(Debug, Default)]
struct RepState {
    pre: Option<String>,
    post: Option<String>,
    compiled: bool,
    modified: bool,
    created: bool,
}

/// One named, independently compiled variant of an item's output.
#[derive(Debug)]
pub struct ItemRep {
    item_identifier: String,
    name: String,
    overrides: AttributeMap,
    state: RwLock<RepState>,
}

impl ItemRep {
    pub(crate) fn new(item_identifier: &str, name: &str, overrides: AttributeMap) -> Self {
        Self {
            item_identifier: item_identifier.to_string(),
            name: name.to_string(),
            overrides,
            state: RwLock::new(RepState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-representation attribute overrides fixed at build time.
    pub fn overrides(&self) -> &AttributeMap {
        &self.overrides
    }

    pub fn id(&self) -> RepId {
        RepId {
            item: self.item_identifier.clone(),
            rep: self.name.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------------

    /// Whether the most recent compile attempt completed the pipeline.
    pub fn is_compiled(&self) -> bool {
        self.state.read().compiled
    }

    /// Whether the most recent compile produced output where none existed.
    pub fn is_created(&self) -> bool {
        self.state.read().created
    }

    /// Whether the most recent compile changed the output content.
    pub fn is_modified(&self) -> bool {
        self.state.read().modified
    }

    pub(crate) fn reset_flags(&self) {
        let mut state = self.state.write();
        state.compiled = false;
        state.modified = false;
        state.created = false;
    }

    pub(crate) fn finish(&self, created: bool, modified: bool) {
        let mut state = self.state.write();
        state.compiled = true;
        state.created = created;
        state.modified = modified;
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// The cached content at `snapshot`, if it has been computed.
    pub fn snapshot(&self, snapshot: Snapshot) -> Option<String> {
        let state = self.state.read();
        match snapshot {
            Snapshot::Pre => state.pre.clone(),
            Snapshot::Post => state.post.clone(),
        }
    }

    pub(crate) fn set_snapshot(&self, snapshot: Snapshot, content: String) {
        let mut state = self.state.write();
        match snapshot {
            Snapshot::Pre => state.pre = Some(content),
            Snapshot::Post => state.post = Some(content),
        }
    }

    /// Content at a snapshot, compiling on demand.
    ///
    /// A cached snapshot is returned as-is with no side effects.
    /// Otherwise this delegates to the site's compiler (compile-if-needed
    /// mode) and re-reads the cache; a compile that was skipped because
    /// the representation is up to date leaves the snapshot unset, which
    /// surfaces as [`CompileError::Snapshot`].
    pub fn content_at(
        &self,
        site: &Site,
        item: &Item,
        snapshot: Snapshot,
    ) -> Result<String, CompileError> {
        if let Some(content) = self.snapshot(snapshot) {
            return Ok(content);
        }
        site.compiler().compile_rep(site, item, self, false)?;
        self.snapshot(snapshot).ok_or_else(|| CompileError::Snapshot {
            rep: self.id(),
            snapshot,
        })
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Resolve an attribute through the cascade: rep overrides, item
    /// attributes (default rep only), per-rep defaults, global defaults,
    /// built-ins.
    pub fn attribute<'a>(
        &'a self,
        item: &'a Item,
        defaults: &'a Defaults,
        name: &str,
    ) -> Option<&'a Value> {
        attributes::resolve(
            &self.name,
            &self.overrides,
            item.attributes(),
            defaults,
            name,
        )
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    /// Disk path of this representation's output file. Delegates to the
    /// site's router on every call; the result is not cached here.
    pub fn disk_path(&self, site: &Site, item: &Item) -> PathBuf {
        site.router().disk_path_for(site, item, self)
    }

    /// Web path this representation is served from. Delegates to the
    /// site's router on every call.
    pub fn web_path(&self, site: &Site, item: &Item) -> String {
        site.router().web_path_for(site, item, self)
    }

    // ------------------------------------------------------------------------
    // Staleness
    // ------------------------------------------------------------------------

    /// Whether the cached output can no longer be trusted.
    ///
    /// An unset timestamp anywhere in the dependency set is never treated
    /// as safe: it forces recompilation. The comparison anchor is the
    /// output file's mtime, so the verdict is stable across process
    /// restarts.
    pub fn outdated(&self, site: &Site, item: &Item) -> bool {
        let Some(item_mtime) = item.mtime() else {
            return true;
        };

        let path = self.disk_path(site, item);
        if !site.vfs().exists(&path) {
            return true;
        }
        let Some(output_mtime) = site.vfs().modified_time(&path) else {
            return true;
        };

        if output_mtime < item_mtime {
            return true;
        }

        for layout in site.layouts() {
            match layout.mtime() {
                None => return true,
                Some(mtime) if mtime > output_mtime => return true,
                _ => {}
            }
        }

        match site.defaults().mtime() {
            None => return true,
            Some(mtime) if mtime > output_mtime => return true,
            _ => {}
        }

        if let Some(code) = site.code() {
            match code.mtime() {
                None => return true,
                Some(mtime) if mtime > output_mtime => return true,
                _ => {}
            }
        }

        false
    }
}
