//! Output path resolution.
//!
//! Routers turn a representation into the disk path its output is written
//! to and the web path it is served from. The compilation core calls the
//! router exactly once per access and never caches its results, so
//! callers are free to substitute their own path schemes.

use std::path::{Path, PathBuf};

use toml::Value;

use crate::compiler::rep::ItemRep;
use crate::data::{DEFAULT_REP, Item};
use crate::site::Site;

/// Path resolution boundary.
pub trait Router: Send + Sync {
    /// Absolute or output-relative disk path for a representation's
    /// output file.
    fn disk_path_for(&self, site: &Site, item: &Item, rep: &ItemRep) -> PathBuf;

    /// Web path the representation's output is served from.
    fn web_path_for(&self, site: &Site, item: &Item, rep: &ItemRep) -> String;
}

// ============================================================================
// Default router
// ============================================================================

/// Maps identifier `/foo/` to `<output>/foo/<filename>.<extension>`,
/// honoring the `filename` and `extension` attributes. Representations
/// not named `default` get a `-<name>` filename suffix so they never
/// collide with the default output.
#[derive(Debug, Clone)]
pub struct DefaultRouter {
    output_dir: PathBuf,
}

impl DefaultRouter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn relative_path(&self, site: &Site, item: &Item, rep: &ItemRep) -> String {
        let attribute = |name: &str, fallback: &str| {
            rep.attribute(item, site.defaults(), name)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };
        let filename = attribute("filename", "index");
        let extension = attribute("extension", "html");

        let suffix = if rep.name() == DEFAULT_REP {
            String::new()
        } else {
            format!("-{}", rep.name())
        };

        let dir = item.identifier().trim_start_matches('/');
        format!("{dir}{filename}{suffix}.{extension}")
    }
}

impl Router for DefaultRouter {
    fn disk_path_for(&self, site: &Site, item: &Item, rep: &ItemRep) -> PathBuf {
        self.output_dir.join(self.relative_path(site, item, rep))
    }

    fn web_path_for(&self, site: &Site, item: &Item, rep: &ItemRep) -> String {
        let web = format!("/{}", self.relative_path(site, item, rep));
        // Directory indexes are served from the directory itself
        match web.strip_suffix("index.html") {
            Some(stripped) => stripped.to_string(),
            None => web,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Defaults;
    use toml::toml;

    fn site_with_item(attributes: crate::data::AttributeMap) -> Site {
        let mut site = Site::new(Defaults::default());
        site.set_router(Box::new(DefaultRouter::new("out")));
        site.add_item(Item::new("content", attributes, "/foo/"));
        site.build_reps();
        site
    }

    #[test]
    fn test_default_rep_paths() {
        let site = site_with_item(toml::map::Map::new());
        let item = site.item("/foo/").unwrap();
        let rep = item.rep(DEFAULT_REP).unwrap();

        assert_eq!(
            rep.disk_path(&site, item),
            PathBuf::from("out/foo/index.html")
        );
        assert_eq!(rep.web_path(&site, item), "/foo/");
    }

    #[test]
    fn test_custom_rep_gets_name_suffix() {
        let site = site_with_item(toml! {
            [reps.plain]
            extension = "txt"
        });
        let item = site.item("/foo/").unwrap();
        let rep = item.rep("plain").unwrap();

        assert_eq!(
            rep.disk_path(&site, item),
            PathBuf::from("out/foo/index-plain.txt")
        );
        assert_eq!(rep.web_path(&site, item), "/foo/index-plain.txt");
    }

    #[test]
    fn test_filename_and_extension_attributes() {
        let site = site_with_item(toml! {
            filename = "feed"
            extension = "xml"
        });
        let item = site.item("/foo/").unwrap();
        let rep = item.rep(DEFAULT_REP).unwrap();

        assert_eq!(
            rep.disk_path(&site, item),
            PathBuf::from("out/foo/feed.xml")
        );
        assert_eq!(rep.web_path(&site, item), "/foo/feed.xml");
    }

    #[test]
    fn test_root_identifier() {
        let mut site = Site::new(Defaults::default());
        site.set_router(Box::new(DefaultRouter::new("out")));
        site.add_item(Item::new("content", toml::map::Map::new(), "/"));
        site.build_reps();

        let item = site.item("/").unwrap();
        let rep = item.rep(DEFAULT_REP).unwrap();
        assert_eq!(rep.disk_path(&site, item), PathBuf::from("out/index.html"));
        assert_eq!(rep.web_path(&site, item), "/");
    }
}
