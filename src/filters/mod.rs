//! The transformation-step boundary.
//!
//! Filters are named transformations over a content string plus a
//! context. The available filter set is configuration: the compiler only
//! ever sees the [`FilterRunner`] trait, and [`FilterRegistry`] is the
//! stock implementation — a name → filter table with the built-ins
//! pre-registered.

pub mod template;

use rustc_hash::FxHashMap;
use toml::Value;

use crate::compiler::rep::ItemRep;
use crate::data::Item;
use crate::error::CompileError;
use crate::site::Site;

pub use template::TemplateFilter;

// ============================================================================
// Context
// ============================================================================

/// Everything a filter may consult while transforming content.
///
/// Filters see the whole site, which is what lets a transformation read
/// other representations' content — and what makes compilation cycles
/// reachable (and detectable) in the first place.
pub struct FilterContext<'a> {
    site: &'a Site,
    item: &'a Item,
    rep: &'a ItemRep,
    vars: FxHashMap<String, String>,
}

impl<'a> FilterContext<'a> {
    pub fn new(site: &'a Site, item: &'a Item, rep: &'a ItemRep) -> Self {
        Self {
            site,
            item,
            rep,
            vars: FxHashMap::default(),
        }
    }

    /// Bind a variable visible to template expressions.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn site(&self) -> &'a Site {
        self.site
    }

    pub fn item(&self) -> &'a Item {
        self.item
    }

    pub fn rep(&self) -> &'a ItemRep {
        self.rep
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Resolve an attribute through the representation's fallback layers.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.rep.attribute(self.item, self.site.defaults(), name)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A single named transformation.
pub trait Filter: Send + Sync {
    fn apply(&self, content: &str, ctx: &FilterContext<'_>) -> anyhow::Result<String>;
}

/// Runs a filter by name; the boundary the compiler depends on.
pub trait FilterRunner: Send + Sync {
    fn run(
        &self,
        name: &str,
        content: &str,
        ctx: &FilterContext<'_>,
    ) -> Result<String, CompileError>;
}

// ============================================================================
// Registry
// ============================================================================

/// Name → filter table implementing [`FilterRunner`].
#[derive(Default)]
pub struct FilterRegistry {
    filters: FxHashMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in filters registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("template", Box::new(TemplateFilter));
        registry.register("trim", Box::new(TrimFilter));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, filter: Box<dyn Filter>) {
        self.filters.insert(name.into(), filter);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl FilterRunner for FilterRegistry {
    fn run(
        &self,
        name: &str,
        content: &str,
        ctx: &FilterContext<'_>,
    ) -> Result<String, CompileError> {
        let Some(filter) = self.filters.get(name) else {
            return Err(CompileError::UnknownFilter {
                rep: ctx.rep().id(),
                filter: name.to_string(),
            });
        };
        filter
            .apply(content, ctx)
            .map_err(|source| CompileError::Filter {
                rep: ctx.rep().id(),
                filter: name.to_string(),
                source,
            })
    }
}

// ============================================================================
// Built-ins
// ============================================================================

/// Trims surrounding whitespace.
pub struct TrimFilter;

impl Filter for TrimFilter {
    fn apply(&self, content: &str, _ctx: &FilterContext<'_>) -> anyhow::Result<String> {
        Ok(content.trim().to_string())
    }
}
