//! Stanza - the incremental compilation core of a static-content
//! generator.
//!
//! For each content item, stanza decides whether a cached compiled
//! output is still valid and, if not, recompiles it by running the
//! configured transformation steps and caching intermediate snapshots.
//! Staleness is recomputed every run from source and output timestamps
//! (item, defaults, layouts, extension code, previous output file);
//! recompilation is lazy and cycle-safe: reading a representation's
//! content compiles it on demand, and an explicit compilation stack
//! rejects re-entrant compiles instead of recursing forever.
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let site = stanza::load_site(Path::new("my-site"))?;
//! let report = site.compile(false);
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod data;
pub mod error;
pub mod filters;
pub mod loader;
pub mod router;
pub mod site;
pub mod utils;

pub use compiler::{CompileOutcome, CompileReport, Compiler, ItemRep, RepId, Snapshot};
pub use config::SiteConfig;
pub use data::{AttributeMap, Code, Defaults, Item, Layout, MemoryVfs, NativeVfs, Vfs};
pub use error::CompileError;
pub use filters::{Filter, FilterContext, FilterRegistry, FilterRunner};
pub use loader::load_site;
pub use router::{DefaultRouter, Router};
pub use site::Site;
