//! Site data: items, layouts, extension code, fallback attributes, and
//! the filesystem boundary.

pub mod attributes;
pub mod code;
pub mod defaults;
pub mod item;
pub mod layout;
pub mod vfs;

pub use attributes::{AttributeMap, DEFAULT_REP};
pub use code::Code;
pub use defaults::Defaults;
pub use item::Item;
pub use layout::Layout;
pub use vfs::{MemoryVfs, NativeVfs, Vfs};
