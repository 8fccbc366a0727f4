//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

use std::path::PathBuf;

pub fn content() -> PathBuf {
    "content".into()
}

pub fn layouts() -> PathBuf {
    "layouts".into()
}

pub fn lib_dir() -> PathBuf {
    "lib".into()
}

pub fn output() -> PathBuf {
    "output".into()
}

pub fn defaults_file() -> PathBuf {
    "defaults.toml".into()
}
