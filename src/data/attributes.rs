//! Cascading attribute resolution.
//!
//! Attributes are TOML values. Every representation resolves an attribute
//! through an ordered list of fallback layers; the first layer that yields
//! a value wins:
//!
//! 1. the representation's own overrides,
//! 2. the owning item's attributes (only for the `default` representation;
//!    a custom-named representation does not inherit the item's general
//!    attributes),
//! 3. the site defaults' per-representation overrides,
//! 4. the site defaults' global attributes,
//! 5. the built-in defaults table.
//!
//! An attribute absent from every layer resolves to `None`; required-vs-
//! optional semantics are the caller's concern.

use std::sync::LazyLock;

use toml::Value;

use super::defaults::Defaults;

/// An ordered attribute mapping, as parsed from TOML.
pub type AttributeMap = toml::map::Map<String, Value>;

/// Name of the representation every item carries unless configured
/// otherwise.
pub const DEFAULT_REP: &str = "default";

/// Key of the per-representation attribute sub-table.
pub const REPS_KEY: &str = "reps";

/// Built-in fallbacks applied when no configured layer yields a value.
static BUILTIN_DEFAULTS: LazyLock<AttributeMap> = LazyLock::new(|| {
    let mut table = AttributeMap::new();
    table.insert("extension".into(), Value::String("html".into()));
    table.insert("filename".into(), Value::String("index".into()));
    table.insert("filters_pre".into(), Value::Array(Vec::new()));
    table.insert("filters_post".into(), Value::Array(Vec::new()));
    table.insert("layout".into(), Value::String("default".into()));
    table.insert("skip_output".into(), Value::Boolean(false));
    table
});

/// Look up `name` in the built-in defaults table.
pub fn builtin_default(name: &str) -> Option<&'static Value> {
    BUILTIN_DEFAULTS.get(name)
}

/// Resolve an attribute for the representation `rep_name`.
///
/// Tries each fallback layer in order and returns the first value found.
/// The item layer is skipped for representations not named `default`.
pub fn resolve<'a>(
    rep_name: &str,
    rep_overrides: &'a AttributeMap,
    item_attributes: &'a AttributeMap,
    defaults: &'a Defaults,
    name: &str,
) -> Option<&'a Value> {
    rep_overrides
        .get(name)
        .or_else(|| {
            if rep_name == DEFAULT_REP {
                item_attributes.get(name)
            } else {
                None
            }
        })
        .or_else(|| defaults.rep_attribute(rep_name, name))
        .or_else(|| defaults.attribute(name))
        .or_else(|| builtin_default(name))
}

/// Interpret an attribute value as a list of strings.
///
/// Non-array values and non-string elements yield an empty list; filter
/// chains are configuration, and a malformed chain simply runs nothing.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Render an attribute value as a plain string.
///
/// Strings come back unquoted; any other value uses its TOML notation.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
