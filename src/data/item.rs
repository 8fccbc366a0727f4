//! Content items and representation building.

use std::time::SystemTime;

use toml::Value;

use super::attributes::{AttributeMap, DEFAULT_REP, REPS_KEY};
use super::defaults::Defaults;
use crate::compiler::rep::ItemRep;

/// A unit of source content: raw content, an attribute mapping, an
/// identifying path and a last-modified timestamp.
///
/// An item owns its representations; they are built once via
/// [`Item::build_reps`] after the item has been attached to a site's
/// defaults.
#[derive(Debug)]
pub struct Item {
    content: String,
    attributes: AttributeMap,
    identifier: String,
    mtime: Option<SystemTime>,
    reps: Vec<ItemRep>,
}

impl Item {
    pub fn new(
        content: impl Into<String>,
        attributes: AttributeMap,
        identifier: impl AsRef<str>,
    ) -> Self {
        Self {
            content: content.into(),
            attributes,
            identifier: normalize_identifier(identifier.as_ref()),
            mtime: None,
            reps: Vec::new(),
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

    /// Build this item's representations.
    ///
    /// The representation names are the union of the defaults' `reps`
    /// keys, the item's own `reps` keys, and `default`. An item `reps`
    /// entry holding a non-table value disables that representation; a
    /// table value becomes the representation's fixed overrides.
    pub fn build_reps(&mut self, defaults: &Defaults) {
        let mut names: Vec<String> = Vec::new();
        for name in defaults.rep_names() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        for name in self.rep_table_keys() {
            if !names.iter().any(|n| n == &name) {
                names.push(name);
            }
        }
        if !names.iter().any(|n| n == DEFAULT_REP) {
            names.push(DEFAULT_REP.to_string());
        }

        let reps = names
            .into_iter()
            .filter_map(|name| match self.rep_entry(&name) {
                Some(Value::Table(overrides)) => {
                    Some(ItemRep::new(&self.identifier, &name, overrides.clone()))
                }
                // An explicit non-table entry opts the representation out
                Some(_) => None,
                None => Some(ItemRep::new(&self.identifier, &name, AttributeMap::new())),
            })
            .collect();
        self.reps = reps;
    }

    pub fn reps(&self) -> &[ItemRep] {
        &self.reps
    }

    pub fn rep(&self, name: &str) -> Option<&ItemRep> {
        self.reps.iter().find(|rep| rep.name() == name)
    }

    fn rep_entry(&self, name: &str) -> Option<&Value> {
        self.attributes
            .get(REPS_KEY)
            .and_then(Value::as_table)
            .and_then(|reps| reps.get(name))
    }

    fn rep_table_keys(&self) -> Vec<String> {
        self.attributes
            .get(REPS_KEY)
            .and_then(Value::as_table)
            .map(|reps| reps.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Normalize an identifier to the canonical `/…/` form.
fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::toml;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("/foo/"), "/foo/");
        assert_eq!(normalize_identifier("foo"), "/foo/");
        assert_eq!(normalize_identifier("/foo/bar"), "/foo/bar/");
        assert_eq!(normalize_identifier("/"), "/");
        assert_eq!(normalize_identifier(""), "/");
    }

    #[test]
    fn test_build_reps_always_includes_default() {
        let mut item = Item::new("content", toml! { foo = "bar" }, "/foo/");
        item.build_reps(&Defaults::default());

        assert_eq!(item.reps().len(), 1);
        assert!(item.rep(DEFAULT_REP).is_some());
    }

    #[test]
    fn test_build_reps_union_with_defaults() {
        let defaults = Defaults::new(toml! {
            [reps.feed]
            extension = "xml"
        });
        let mut item = Item::new(
            "content",
            toml! {
                [reps.plain]
                extension = "txt"
            },
            "/foo/",
        );
        item.build_reps(&defaults);

        assert_eq!(item.reps().len(), 3);
        assert!(item.rep("feed").is_some());
        assert!(item.rep("plain").is_some());
        assert!(item.rep(DEFAULT_REP).is_some());
    }

    #[test]
    fn test_build_reps_explicit_opt_out() {
        let mut item = Item::new(
            "content",
            toml! {
                [reps]
                default = false

                [reps.plain]
                extension = "txt"
            },
            "/foo/",
        );
        item.build_reps(&Defaults::default());

        assert!(item.rep(DEFAULT_REP).is_none());
        assert!(item.rep("plain").is_some());
    }

    #[test]
    fn test_build_reps_stores_overrides() {
        let mut item = Item::new(
            "content",
            toml! {
                [reps.plain]
                extension = "txt"
            },
            "/foo/",
        );
        item.build_reps(&Defaults::default());

        let rep = item.rep("plain").unwrap();
        assert_eq!(
            rep.overrides().get("extension").and_then(Value::as_str),
            Some("txt")
        );
        assert!(item.rep(DEFAULT_REP).unwrap().overrides().is_empty());
    }

    #[test]
    fn test_fresh_rep_state() {
        let mut item = Item::new("content", toml! { foo = "bar" }, "/foo/");
        item.build_reps(&Defaults::default());

        let rep = item.rep(DEFAULT_REP).unwrap();
        assert!(rep.snapshot(crate::compiler::Snapshot::Pre).is_none());
        assert!(rep.snapshot(crate::compiler::Snapshot::Post).is_none());
        assert!(!rep.is_compiled());
        assert!(!rep.is_modified());
        assert!(!rep.is_created());
    }

    #[test]
    fn test_rebuilding_reps_resets_them() {
        let mut item = Item::new("content", AttributeMap::new(), "/foo/");
        item.build_reps(&Defaults::default());
        assert_eq!(item.reps().len(), 1);

        item.build_reps(&Defaults::default());
        assert_eq!(item.reps().len(), 1);
    }
}
