//! Reusable wrapper templates.

use std::time::SystemTime;

use toml::Value;

use super::attributes::AttributeMap;

/// Fallback processor filter for layouts that do not name one.
const DEFAULT_PROCESSOR: &str = "template";

/// A reusable wrapper template applied to a representation's pre-rendered
/// content. Participates in staleness checks through its timestamp.
#[derive(Debug, Clone)]
pub struct Layout {
    content: String,
    attributes: AttributeMap,
    identifier: String,
    mtime: Option<SystemTime>,
}

impl Layout {
    pub fn new(
        content: impl Into<String>,
        attributes: AttributeMap,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            attributes,
            identifier: identifier.into(),
            mtime: None,
        }
    }

    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    pub fn set_mtime(&mut self, mtime: Option<SystemTime>) {
        self.mtime = mtime;
    }

    /// Name of the filter that renders this layout.
    pub fn processor(&self) -> &str {
        self.attributes
            .get("filter")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROCESSOR)
    }
}
