//! Site tree configuration for `site.toml`.
//!
//! Describes where a site keeps its pieces:
//!
//! | Field      | Purpose                                   |
//! |------------|-------------------------------------------|
//! | `content`  | Source items                              |
//! | `layouts`  | Wrapper templates                         |
//! | `lib`      | Extension code (staleness tracking only)  |
//! | `output`   | Compiled output files                     |
//! | `defaults` | Site-wide fallback attributes (TOML file) |
//!
//! # Example
//!
//! ```toml
//! content = "content"
//! layouts = "layouts"
//! output = "public"
//! defaults = "defaults.toml"
//! ```

pub mod defaults;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

/// Name of the optional configuration file in a site root.
pub const CONFIG_FILE: &str = "site.toml";

/// Directory layout of a site tree, relative to its root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Source content directory
    #[serde(default = "defaults::content")]
    pub content: PathBuf,

    /// Layout templates directory
    #[serde(default = "defaults::layouts")]
    pub layouts: PathBuf,

    /// Extension code directory
    #[serde(default = "defaults::lib_dir")]
    pub lib: PathBuf,

    /// Output directory
    #[serde(default = "defaults::output")]
    pub output: PathBuf,

    /// Fallback attributes file
    #[serde(default = "defaults::defaults_file")]
    pub defaults: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content: defaults::content(),
            layouts: defaults::layouts(),
            lib: defaults::lib_dir(),
            output: defaults::output(),
            defaults: defaults::defaults_file(),
        }
    }
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load `site.toml` from a site root, falling back to the default
    /// layout when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }
}
