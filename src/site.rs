//! Site wiring: data, collaborator boundaries, and the compiler.

use crate::compiler::{CompileReport, Compiler};
use crate::data::{Code, Defaults, Item, Layout, NativeVfs, Vfs};
use crate::filters::{FilterRegistry, FilterRunner};
use crate::router::{DefaultRouter, Router};

/// A site: the items, layouts and extension code to compile, the
/// fallback attributes, and the collaborator boundaries (router, filter
/// runner, filesystem) the compilation core talks to.
///
/// The site is threaded explicitly through every operation; the core
/// keeps no ambient global state.
pub struct Site {
    items: Vec<Item>,
    layouts: Vec<Layout>,
    code: Option<Code>,
    defaults: Defaults,
    router: Box<dyn Router>,
    filters: Box<dyn FilterRunner>,
    vfs: Box<dyn Vfs>,
    compiler: Compiler,
}

impl Site {
    /// A site with the stock collaborators: `DefaultRouter` into
    /// `output/`, the built-in filter registry, and the native
    /// filesystem.
    pub fn new(defaults: Defaults) -> Self {
        Self {
            items: Vec::new(),
            layouts: Vec::new(),
            code: None,
            defaults,
            router: Box::new(DefaultRouter::new("output")),
            filters: Box::new(FilterRegistry::with_builtins()),
            vfs: Box::new(NativeVfs),
            compiler: Compiler::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, identifier: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.identifier() == identifier)
    }

    pub fn item_mut(&mut self, identifier: &str) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.identifier() == identifier)
    }

    pub fn add_layout(&mut self, layout: Layout) {
        self.layouts.push(layout);
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout(&self, identifier: &str) -> Option<&Layout> {
        self.layouts
            .iter()
            .find(|layout| layout.identifier() == identifier)
    }

    pub fn layout_mut(&mut self, identifier: &str) -> Option<&mut Layout> {
        self.layouts
            .iter_mut()
            .find(|layout| layout.identifier() == identifier)
    }

    pub fn set_code(&mut self, code: Code) {
        self.code = Some(code);
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    pub fn code_mut(&mut self) -> Option<&mut Code> {
        self.code.as_mut()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    // ------------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------------

    pub fn set_router(&mut self, router: Box<dyn Router>) {
        self.router = router;
    }

    pub fn router(&self) -> &dyn Router {
        self.router.as_ref()
    }

    pub fn set_filters(&mut self, filters: Box<dyn FilterRunner>) {
        self.filters = filters;
    }

    pub fn filters(&self) -> &dyn FilterRunner {
        self.filters.as_ref()
    }

    pub fn set_vfs(&mut self, vfs: Box<dyn Vfs>) {
        self.vfs = vfs;
    }

    pub fn vfs(&self) -> &dyn Vfs {
        self.vfs.as_ref()
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Build every item's representations against the site defaults.
    pub fn build_reps(&mut self) {
        let defaults = &self.defaults;
        for item in &mut self.items {
            item.build_reps(defaults);
        }
    }

    /// Compile every representation of every item.
    pub fn compile(&self, force: bool) -> CompileReport {
        self.compiler.compile_site(self, force)
    }
}
