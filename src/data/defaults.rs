//! Site-wide fallback attributes.

use std::time::SystemTime;

use anyhow::Result;

use super::attributes::{AttributeMap, REPS_KEY};
use toml::Value;

/// Global fallback attributes, optionally specialized per representation
/// name through a nested `reps` sub-table, plus a last-modified timestamp.
///
/// The timestamp participates in staleness checks: a defaults file newer
/// than a representation's output means that output can no longer be
/// trusted.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    attributes: AttributeMap,
    mtime: Option<SystemTime>,
}

impl Defaults {
    pub fn new(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            mtime: None,
        }
    }

    /// Parse defaults from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let attributes: AttributeMap = toml::from_str(content)?;
        Ok(Self::new(attributes))
    }

    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn set_mtime(&mut self, mtime: Option<SystemTime>) {
        self.mtime = mtime;
    }

    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Look up a global fallback attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The per-representation override table for `rep_name`, if any.
    pub fn rep_table(&self, rep_name: &str) -> Option<&AttributeMap> {
        self.attributes
            .get(REPS_KEY)
            .and_then(Value::as_table)
            .and_then(|reps| reps.get(rep_name))
            .and_then(Value::as_table)
    }

    /// Look up a per-representation fallback attribute.
    pub fn rep_attribute(&self, rep_name: &str, name: &str) -> Option<&Value> {
        self.rep_table(rep_name).and_then(|table| table.get(name))
    }

    /// Names of all representations the defaults declare overrides for.
    pub fn rep_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get(REPS_KEY)
            .and_then(Value::as_table)
            .into_iter()
            .flat_map(|reps| reps.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::toml;

    #[test]
    fn test_attribute_lookup() {
        let defaults = Defaults::new(toml! {
            author = "alice"

            [reps.feed]
            extension = "xml"
        });

        assert_eq!(
            defaults.attribute("author").and_then(Value::as_str),
            Some("alice")
        );
        assert!(defaults.attribute("missing").is_none());
        assert_eq!(
            defaults.rep_attribute("feed", "extension").and_then(Value::as_str),
            Some("xml")
        );
        assert!(defaults.rep_attribute("feed", "author").is_none());
        assert!(defaults.rep_attribute("other", "extension").is_none());
    }

    #[test]
    fn test_rep_names() {
        let defaults = Defaults::new(toml! {
            [reps.feed]
            extension = "xml"

            [reps.plain]
            extension = "txt"
        });

        let names: Vec<_> = defaults.rep_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"feed"));
        assert!(names.contains(&"plain"));
    }

    #[test]
    fn test_from_toml_str() {
        let defaults = Defaults::from_toml_str("title = \"site\"\n").unwrap();
        assert_eq!(
            defaults.attribute("title").and_then(Value::as_str),
            Some("site")
        );
        assert!(defaults.mtime().is_none());

        assert!(Defaults::from_toml_str("= not toml").is_err());
    }

    #[test]
    fn test_mtime_bookkeeping() {
        let stamp = SystemTime::UNIX_EPOCH;
        let mut defaults = Defaults::default().with_mtime(stamp);
        assert_eq!(defaults.mtime(), Some(stamp));
        defaults.set_mtime(None);
        assert!(defaults.mtime().is_none());
    }
}
