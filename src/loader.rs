//! Filesystem data source: build a [`Site`] from a directory tree.
//!
//! Expected layout (directories configurable through `site.toml`):
//!
//! ```text
//! <root>/
//!   site.toml          optional directory layout overrides
//!   defaults.toml      site-wide fallback attributes
//!   content/**         items, with optional `+++` TOML front matter
//!   layouts/*          wrapper templates, front matter supported
//!   lib/**             extension code (tracked for staleness only)
//! ```
//!
//! Identifiers derive from content-relative paths: `about.md` becomes
//! `/about/`, `posts/first.md` becomes `/posts/first/`, and an `index`
//! file stands for its directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::data::attributes::AttributeMap;
use crate::data::{Code, Defaults, Item, Layout};
use crate::log;
use crate::router::DefaultRouter;
use crate::site::Site;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Front matter fence line.
const FRONT_MATTER_FENCE: &str = "+++";

/// Load a site from a directory tree.
pub fn load_site(root: &Path) -> Result<Site> {
    let config = SiteConfig::load(root)?;

    let defaults_path = root.join(&config.defaults);
    let defaults = if defaults_path.is_file() {
        load_defaults(&defaults_path)
            .with_context(|| format!("failed to load defaults from `{}`", defaults_path.display()))?
    } else {
        Defaults::default()
    };

    let mut site = Site::new(defaults);
    site.set_router(Box::new(DefaultRouter::new(root.join(&config.output))));

    let content_dir = root.join(&config.content);
    for path in collect_files(&content_dir) {
        let item = load_item(&path, &content_dir)
            .with_context(|| format!("failed to load item `{}`", path.display()))?;
        site.add_item(item);
    }

    let layouts_dir = root.join(&config.layouts);
    for path in collect_files(&layouts_dir) {
        let layout = load_layout(&path)
            .with_context(|| format!("failed to load layout `{}`", path.display()))?;
        site.add_layout(layout);
    }

    if let Some(code) = load_code(&root.join(&config.lib))? {
        site.set_code(code);
    }

    site.build_reps();
    log!("load"; "{} items, {} layouts", site.items().len(), site.layouts().len());

    Ok(site)
}

/// Collect all files from a directory recursively, sorted for
/// deterministic ordering.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn load_item(path: &Path, base: &Path) -> Result<Item> {
    let source = fs::read_to_string(path)?;
    let (attributes, body) = split_front_matter(&source)?;

    let relative = path.strip_prefix(base)?;
    let mut item = Item::new(body, attributes, identifier_for(relative));
    if let Some(mtime) = file_mtime(path) {
        item = item.with_mtime(mtime);
    }
    Ok(item)
}

fn load_layout(path: &Path) -> Result<Layout> {
    let source = fs::read_to_string(path)?;
    let (attributes, body) = split_front_matter(&source)?;

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let mut layout = Layout::new(body, attributes, format!("/{stem}/"));
    if let Some(mtime) = file_mtime(path) {
        layout = layout.with_mtime(mtime);
    }
    Ok(layout)
}

/// Concatenate all extension-code files; the newest mtime wins.
fn load_code(lib_dir: &Path) -> Result<Option<Code>> {
    let files = collect_files(lib_dir);
    if files.is_empty() {
        return Ok(None);
    }

    let mut content = String::new();
    let mut newest: Option<SystemTime> = None;
    for path in &files {
        content.push_str(&fs::read_to_string(path)?);
        content.push('\n');
        if let Some(mtime) = file_mtime(path) {
            newest = Some(newest.map_or(mtime, |current| current.max(mtime)));
        }
    }

    let mut code = Code::new(content);
    if let Some(mtime) = newest {
        code = code.with_mtime(mtime);
    }
    Ok(Some(code))
}

fn load_defaults(path: &Path) -> Result<Defaults> {
    let content = fs::read_to_string(path)?;
    let mut defaults = Defaults::from_toml_str(&content)?;
    defaults.set_mtime(file_mtime(path));
    Ok(defaults)
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Split optional `+++`-fenced TOML front matter from a source file.
pub fn split_front_matter(source: &str) -> Result<(AttributeMap, String)> {
    let source = source.trim_start_matches('\u{feff}');
    let Some(after_fence) = source.strip_prefix(FRONT_MATTER_FENCE) else {
        return Ok((AttributeMap::new(), source.to_string()));
    };
    let Some(after_fence) = after_fence
        .strip_prefix("\r\n")
        .or_else(|| after_fence.strip_prefix('\n'))
    else {
        // A line that merely starts with the fence characters is content
        return Ok((AttributeMap::new(), source.to_string()));
    };

    let mut offset = 0;
    for line in after_fence.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FRONT_MATTER_FENCE {
            let matter = &after_fence[..offset];
            let body = &after_fence[offset + line.len()..];
            let attributes: AttributeMap =
                toml::from_str(matter).context("invalid TOML front matter")?;
            return Ok((attributes, body.to_string()));
        }
        offset += line.len();
    }

    bail!("unterminated front matter (missing closing `{FRONT_MATTER_FENCE}`)")
}

/// Derive the canonical `/…/` identifier from a content-relative path.
fn identifier_for(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let stem = relative
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !stem.is_empty() && stem != "index" {
        parts.push(stem);
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use toml::Value;

    #[test]
    fn test_identifier_for() {
        assert_eq!(identifier_for(Path::new("about.md")), "/about/");
        assert_eq!(identifier_for(Path::new("index.md")), "/");
        assert_eq!(identifier_for(Path::new("posts/first.md")), "/posts/first/");
        assert_eq!(identifier_for(Path::new("posts/index.md")), "/posts/");
    }

    #[test]
    fn test_split_front_matter_absent() {
        let (attributes, body) = split_front_matter("plain content\n").unwrap();
        assert!(attributes.is_empty());
        assert_eq!(body, "plain content\n");
    }

    #[test]
    fn test_split_front_matter_present() {
        let source = "+++\ntitle = \"hello\"\n+++\nbody text\n";
        let (attributes, body) = split_front_matter(source).unwrap();
        assert_eq!(
            attributes.get("title").and_then(Value::as_str),
            Some("hello")
        );
        assert_eq!(body, "body text\n");
    }

    #[test]
    fn test_split_front_matter_empty_matter() {
        let (attributes, body) = split_front_matter("+++\n+++\nbody\n").unwrap();
        assert!(attributes.is_empty());
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_split_front_matter_unterminated() {
        assert!(split_front_matter("+++\ntitle = \"x\"\n").is_err());
    }

    #[test]
    fn test_split_front_matter_invalid_toml() {
        assert!(split_front_matter("+++\n= broken\n+++\nbody\n").is_err());
    }

    #[test]
    fn test_fence_lookalike_is_content() {
        let (attributes, body) = split_front_matter("++++heavy crosses\n").unwrap();
        assert!(attributes.is_empty());
        assert_eq!(body, "++++heavy crosses\n");
    }

    #[test]
    fn test_load_site_from_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("content/posts")).unwrap();
        fs::create_dir_all(root.join("layouts")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();

        fs::write(root.join("defaults.toml"), "author = \"alice\"\n").unwrap();
        fs::write(
            root.join("content/index.md"),
            "+++\ntitle = \"home\"\n+++\nwelcome\n",
        )
        .unwrap();
        fs::write(root.join("content/posts/first.md"), "first post\n").unwrap();
        fs::write(root.join("layouts/default.html"), "[<%= content %>]\n").unwrap();
        fs::write(root.join("lib/helpers.rhai"), "fn stuff() {}\n").unwrap();

        let site = load_site(root).unwrap();

        assert_eq!(site.items().len(), 2);
        assert_eq!(site.layouts().len(), 1);

        let home = site.item("/").unwrap();
        assert_eq!(
            home.attributes().get("title").and_then(Value::as_str),
            Some("home")
        );
        assert_eq!(home.content(), "welcome\n");
        assert!(home.mtime().is_some());
        assert!(home.rep("default").is_some());

        let post = site.item("/posts/first/").unwrap();
        assert_eq!(post.content(), "first post\n");

        assert!(site.layout("/default/").is_some());
        assert!(site.code().is_some());
        assert!(site.code().unwrap().mtime().is_some());
        assert_eq!(
            site.defaults().attribute("author").and_then(Value::as_str),
            Some("alice")
        );
        assert!(site.defaults().mtime().is_some());
    }

    #[test]
    fn test_load_site_minimal_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(root.join("content/solo.md"), "alone\n").unwrap();

        let site = load_site(root).unwrap();
        assert_eq!(site.items().len(), 1);
        assert!(site.layouts().is_empty());
        assert!(site.code().is_none());
    }

    #[test]
    fn test_load_site_respects_config() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("site.toml"), "content = \"pages\"\n").unwrap();
        fs::write(root.join("pages/about.md"), "about\n").unwrap();

        let site = load_site(root).unwrap();
        assert!(site.item("/about/").is_some());
    }
}
