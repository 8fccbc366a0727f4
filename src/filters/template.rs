//! Embedded-expression template filter.
//!
//! Evaluates `<%= … %>` expressions inside content. An expression is
//! either a quoted string literal, a bound context variable (layouts bind
//! the wrapped content as `content`), or an attribute of the
//! representation being compiled. Undefined names fail the filter.

use std::sync::LazyLock;

use anyhow::bail;
use regex::Regex;

use super::{Filter, FilterContext};
use crate::data::attributes::value_to_string;

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<%=\s*(.*?)\s*%>").unwrap());

/// The built-in template filter, registered as `template`.
pub struct TemplateFilter;

impl Filter for TemplateFilter {
    fn apply(&self, content: &str, ctx: &FilterContext<'_>) -> anyhow::Result<String> {
        let mut output = String::with_capacity(content.len());
        let mut last_end = 0;

        for captures in EXPRESSION.captures_iter(content) {
            let whole = captures.get(0).unwrap();
            let expression = captures.get(1).unwrap().as_str();

            output.push_str(&content[last_end..whole.start()]);
            output.push_str(&evaluate(expression, ctx)?);
            last_end = whole.end();
        }

        output.push_str(&content[last_end..]);
        Ok(output)
    }
}

/// Evaluate a single expression: literal, variable, or attribute.
fn evaluate(expression: &str, ctx: &FilterContext<'_>) -> anyhow::Result<String> {
    if let Some(literal) = string_literal(expression) {
        return Ok(literal.to_string());
    }
    if let Some(value) = ctx.var(expression) {
        return Ok(value.to_string());
    }
    if let Some(value) = ctx.attribute(expression) {
        return Ok(value_to_string(value));
    }
    bail!("undefined name `{expression}` in template expression")
}

/// Extract the inner text of a single- or double-quoted literal.
fn string_literal(expression: &str) -> Option<&str> {
    for quote in ['\'', '"'] {
        if let Some(inner) = expression
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(inner);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Defaults, Item};
    use crate::site::Site;
    use toml::toml;

    fn test_site() -> Site {
        let mut site = Site::new(Defaults::default());
        let attributes = toml! {
            author = "alice"
            year = 2024
        };
        site.add_item(Item::new("content", attributes, "/foo/"));
        site.build_reps();
        site
    }

    fn apply(site: &Site, content: &str, vars: &[(&str, &str)]) -> anyhow::Result<String> {
        let item = site.item("/foo/").unwrap();
        let rep = item.rep("default").unwrap();
        let mut ctx = FilterContext::new(site, item, rep);
        for (name, value) in vars {
            ctx = ctx.with_var(*name, *value);
        }
        TemplateFilter.apply(content, &ctx)
    }

    #[test]
    fn test_plain_content_passes_through() {
        let site = test_site();
        assert_eq!(apply(&site, "no markup here", &[]).unwrap(), "no markup here");
    }

    #[test]
    fn test_string_literal() {
        let site = test_site();
        assert_eq!(
            apply(&site, "content <%= 'foo' %>", &[]).unwrap(),
            "content foo"
        );
        assert_eq!(apply(&site, "<%= \"bar\" %>", &[]).unwrap(), "bar");
    }

    #[test]
    fn test_bound_variable() {
        let site = test_site();
        assert_eq!(
            apply(&site, "[<%= content %>]", &[("content", "wrapped")]).unwrap(),
            "[wrapped]"
        );
    }

    #[test]
    fn test_attribute_lookup() {
        let site = test_site();
        assert_eq!(
            apply(&site, "by <%= author %>, <%= year %>", &[]).unwrap(),
            "by alice, 2024"
        );
    }

    #[test]
    fn test_undefined_name_fails() {
        let site = test_site();
        let err = apply(&site, "<%= nonsense %>", &[]).unwrap_err();
        assert!(err.to_string().contains("nonsense"));
    }

    #[test]
    fn test_multiple_expressions() {
        let site = test_site();
        assert_eq!(
            apply(&site, "<%= 'a' %>-<%= 'b' %>-<%= 'c' %>", &[]).unwrap(),
            "a-b-c"
        );
    }
}
